//! WiZ fixture integration
//!
//! Fixtures listen for JSON over UDP on a single port. Commands are never
//! acknowledged; discovery replies arrive from each fixture's own address.
//!
//! - [`protocol`] - payload encoding and response parsing
//! - [`sender`] - UDP command output
//! - [`queue`] - bounded hand-off to a sender thread
//! - [`discovery`] - subnet broadcast discovery

pub mod discovery;
pub mod protocol;
pub mod queue;
pub mod sender;
