//! UDP command output
//!
//! Fixtures never acknowledge `setState`, so a send is one `send_to` and
//! nothing more. A lost datagram is superseded by the next frame.

use super::protocol::{encode_command, DEFAULT_PORT};
use crate::{error::ControlError, Result};
use ambilight_core::ColorCommand;
use std::net::{IpAddr, SocketAddr, UdpSocket};

/// Destination for light commands
pub trait CommandSink: Send {
    /// Emit one command
    fn send(&mut self, command: &ColorCommand) -> Result<()>;
}

/// Sends `setState` datagrams to one fixture
pub struct UdpCommandSender {
    socket: UdpSocket,
    target: SocketAddr,
    sent: u64,
}

impl UdpCommandSender {
    /// Create a sender for `ip` on the standard port
    pub fn new(ip: IpAddr) -> Result<Self> {
        Self::with_target(SocketAddr::new(ip, DEFAULT_PORT))
    }

    /// Create a sender for an explicit address
    pub fn with_target(target: SocketAddr) -> Result<Self> {
        if target.ip().is_unspecified() {
            return Err(ControlError::InvalidParameter(format!(
                "Fixture address {} is unspecified",
                target
            )));
        }
        let bind: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind)?;

        tracing::info!("WiZ sender created -> {}", target);

        Ok(Self {
            socket,
            target,
            sent: 0,
        })
    }

    /// Fixture address
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Datagrams sent so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl CommandSink for UdpCommandSender {
    fn send(&mut self, command: &ColorCommand) -> Result<()> {
        let payload = encode_command(command)?;
        self.socket.send_to(&payload, self.target)?;
        self.sent += 1;
        tracing::trace!("Sent {} to {}", command, self.target);
        Ok(())
    }
}
