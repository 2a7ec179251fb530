//! Captured frames
//!
//! A [`Frame`] is a grid of gamma-encoded 8-bit RGB pixels as delivered by
//! the capture collaborator. [`FrameView`] borrows a rectangle of it.

use crate::error::{CoreError, Result};

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Create a new size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole surface
    pub const fn full(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Size of the rectangle
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True if the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Clip the rectangle to a surface of the given size
    pub fn clip_to(&self, bounds: Size) -> Rect {
        let x = self.x.min(bounds.width);
        let y = self.y.min(bounds.height);
        let right = self.x.saturating_add(self.width).min(bounds.width);
        let bottom = self.y.saturating_add(self.height).min(bounds.height);
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Gamma-encoded RGB frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl Frame {
    /// Create a frame from row-major pixels
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 3]>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if expected == 0 {
            return Err(CoreError::InvalidFrame(format!(
                "frame must not be empty ({}x{})",
                width, height
            )));
        }
        if pixels.len() != expected {
            return Err(CoreError::InvalidFrame(format!(
                "{}x{} frame needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a frame from packed `RGBRGB...` bytes
    pub fn from_rgb_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 3 != 0 {
            return Err(CoreError::InvalidFrame(format!(
                "RGB buffer length {} is not a multiple of 3",
                bytes.len()
            )));
        }
        let pixels = bytes
            .chunks_exact(3)
            .map(|px| [px[0], px[1], px[2]])
            .collect();
        Self::new(width, height, pixels)
    }

    /// Frame where every pixel has the same color
    ///
    /// Zero dimensions are raised to one.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            pixels: vec![rgb; width as usize * height as usize],
        }
    }

    /// Frame generated from a function of pixel coordinates
    ///
    /// Zero dimensions are raised to one.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Frame width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frame size
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Pixel at `(x, y)`
    ///
    /// # Panics
    /// Panics if the coordinates are outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Borrow a region of the frame, clipped to the frame bounds
    pub fn view(&self, rect: Rect) -> FrameView<'_> {
        FrameView {
            frame: self,
            rect: rect.clip_to(self.size()),
        }
    }

    /// Borrow the whole frame
    pub fn as_view(&self) -> FrameView<'_> {
        self.view(Rect::full(self.size()))
    }
}

/// Borrowed rectangular region of a [`Frame`]
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    frame: &'a Frame,
    rect: Rect,
}

impl<'a> FrameView<'a> {
    /// Region width
    pub fn width(&self) -> u32 {
        self.rect.width
    }

    /// Region height
    pub fn height(&self) -> u32 {
        self.rect.height
    }

    /// Region within the parent frame
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// True if the region covers no pixels
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// Pixel at `(x, y)` relative to the region origin
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        debug_assert!(x < self.rect.width && y < self.rect.height);
        self.frame.pixel(self.rect.x + x, self.rect.y + y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_length_validation() {
        assert!(Frame::new(2, 2, vec![[0, 0, 0]; 4]).is_ok());
        assert!(Frame::new(2, 2, vec![[0, 0, 0]; 3]).is_err());
        assert!(Frame::new(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_from_rgb_bytes() {
        let frame = Frame::from_rgb_bytes(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(frame.pixel(0, 0), [1, 2, 3]);
        assert_eq!(frame.pixel(1, 0), [4, 5, 6]);
        assert!(Frame::from_rgb_bytes(2, 1, &[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_view_offsets() {
        let frame = Frame::from_fn(4, 4, |x, y| [x as u8, y as u8, 0]);
        let view = frame.view(Rect::new(1, 2, 2, 2));
        assert_eq!(view.width(), 2);
        assert_eq!(view.pixel(0, 0), [1, 2, 0]);
        assert_eq!(view.pixel(1, 1), [2, 3, 0]);
    }

    #[test]
    fn test_view_is_clipped() {
        let frame = Frame::filled(4, 4, [9, 9, 9]);
        let view = frame.view(Rect::new(3, 3, 10, 10));
        assert_eq!(view.rect(), Rect::new(3, 3, 1, 1));

        let outside = frame.view(Rect::new(8, 8, 2, 2));
        assert!(outside.is_empty());
    }
}
