//! Run loops
//!
//! - [`visual`] - capture, pipeline and send at the mode's frame interval
//! - [`sound`] - per-block spectrum color pushed onto the send queue

pub mod sound;
pub mod visual;

pub use sound::SoundBlockHandler;
pub use visual::{RunStats, VisualRunner};
