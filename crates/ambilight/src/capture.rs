//! Image-file frame source
//!
//! Stands in for a screen grabber: an external tool keeps overwriting one
//! image file and every grab re-reads it. The image is the display surface.

use ambilight_core::{CoreError, Frame, FrameSource, Rect, Size};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Reads the display from an image file on every grab
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> ambilight_core::Result<RgbImage> {
        image::open(&self.path)
            .map(|img| img.to_rgb8())
            .map_err(|e| CoreError::Capture(format!("{}: {}", self.path.display(), e)))
    }
}

impl FrameSource for ImageFileSource {
    fn display_size(&mut self) -> ambilight_core::Result<Size> {
        let (width, height) = image::image_dimensions(&self.path)
            .map_err(|e| CoreError::Capture(format!("{}: {}", self.path.display(), e)))?;
        Ok(Size::new(width, height))
    }

    fn grab(&mut self, region: Rect) -> ambilight_core::Result<Frame> {
        let img = self.read()?;
        let region = region.clip_to(Size::new(img.width(), img.height()));
        if region.is_empty() {
            return Err(CoreError::Capture(format!(
                "region {:?} lies outside the {}x{} display",
                region,
                img.width(),
                img.height()
            )));
        }

        let cropped =
            image::imageops::crop_imm(&img, region.x, region.y, region.width, region.height)
                .to_image();
        Frame::from_rgb_bytes(region.width, region.height, cropped.as_raw())
    }
}
