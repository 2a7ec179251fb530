//! Frame acquisition contract
//!
//! Screen grabbing is platform specific and lives outside this crate. A
//! source reports the display surface size and returns encoded RGB pixels
//! for any requested rectangle of it.

use crate::error::Result;
use crate::frame::{Frame, Rect, Size};

/// Supplier of display frames
pub trait FrameSource {
    /// Size of the full addressable display surface
    fn display_size(&mut self) -> Result<Size>;

    /// Grab the pixels of `region`, in encoded 8-bit RGB
    ///
    /// The returned frame covers exactly the requested region clipped to
    /// the display.
    fn grab(&mut self, region: Rect) -> Result<Frame>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn display_size(&mut self) -> Result<Size> {
        (**self).display_size()
    }

    fn grab(&mut self, region: Rect) -> Result<Frame> {
        (**self).grab(region)
    }
}
