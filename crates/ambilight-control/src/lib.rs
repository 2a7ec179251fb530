//! Ambilight Control - Fixture Communication
//!
//! This crate talks to WiZ-style network lights:
//! - **Protocol**: JSON `setState` commands and `getSystemConfig` discovery
//! - **Sender**: fire-and-forget UDP command output
//! - **Queue**: bounded, drop-oldest hand-off from real-time callbacks
//! - **Discovery**: broadcast, collect and dedup fixtures on the local subnet
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ambilight_control::{DiscoveryConfig, DiscoveryService};
//!
//! # async fn demo() -> ambilight_control::Result<()> {
//! let mut service = DiscoveryService::new(DiscoveryConfig::default());
//! for device in service.run().await? {
//!     println!("{} {}", device.ip, device.name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Error types
pub mod error;
/// WiZ protocol, sender, queue and discovery
pub mod wiz;

pub use error::{ControlError, Result};
pub use wiz::discovery::{
    DeviceRegistry, DiscoveredDevice, DiscoveryConfig, DiscoveryPhase, DiscoveryService,
};
pub use wiz::protocol::DEFAULT_PORT;
pub use wiz::queue::{command_queue, CommandConsumer, CommandProducer, SenderHandle, SenderStats};
pub use wiz::sender::{CommandSink, UdpCommandSender};
