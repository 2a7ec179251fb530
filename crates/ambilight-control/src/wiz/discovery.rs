//! Subnet broadcast discovery
//!
//! One run sends the `getSystemConfig` query to the subnet broadcast
//! address a few times, listening all the while, then keeps listening until
//! the overall timeout. Every well-formed reply names a fixture; the first
//! reply from an address wins.
//!
//! ```text
//! Idle -> Broadcasting -> Collecting -> Done
//! ```

use super::protocol::{parse_discovery_response, DEFAULT_PORT, DISCOVERY_QUERY};
use crate::{error::ControlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, trace, warn};

/// Largest reply we expect from a fixture
const MAX_DATAGRAM: usize = 4096;

/// Public address used only to pick the outbound interface; nothing is sent
const ROUTE_PROBE: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Discovery timing and addressing
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Number of broadcasts
    pub retries: u32,
    /// Pause after each broadcast
    pub wait_between: Duration,
    /// Total run time, measured from the first broadcast
    pub timeout: Duration,
    /// Destination port
    pub port: u16,
    /// Broadcast address; derived from the outbound interface when unset
    pub broadcast: Option<Ipv4Addr>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            wait_between: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
            port: DEFAULT_PORT,
            broadcast: None,
        }
    }
}

impl DiscoveryConfig {
    /// Listening time left after the last broadcast,
    /// `timeout - retries * wait_between`, floored at zero
    pub fn collect_window(&self) -> Duration {
        self.timeout
            .saturating_sub(self.wait_between.saturating_mul(self.retries))
    }
}

/// Where a discovery run is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPhase {
    /// Not started
    Idle,
    /// Sending queries
    Broadcasting,
    /// Waiting for late replies
    Collecting,
    /// Finished; the service cannot be reused
    Done,
}

impl fmt::Display for DiscoveryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscoveryPhase::Idle => "idle",
            DiscoveryPhase::Broadcasting => "broadcasting",
            DiscoveryPhase::Collecting => "collecting",
            DiscoveryPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// A fixture that answered the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Module name, MAC, or empty
    pub name: String,
    /// Source address of the reply
    pub ip: IpAddr,
}

/// What [`DeviceRegistry::record`] did with a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// New device
    Added,
    /// Address already known; payload ignored
    Duplicate,
    /// Payload unparseable; nothing recorded
    Malformed,
}

/// Devices seen during one run, at most one per address, in arrival order
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<DiscoveredDevice>,
}

impl DeviceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reply from `ip`
    ///
    /// Known addresses are skipped before the payload is even parsed.
    pub fn record(&mut self, ip: IpAddr, payload: &[u8]) -> RecordOutcome {
        if self.contains(ip) {
            return RecordOutcome::Duplicate;
        }
        match parse_discovery_response(payload) {
            Ok(name) => {
                self.devices.push(DiscoveredDevice { name, ip });
                RecordOutcome::Added
            }
            Err(e) => {
                debug!("Ignoring malformed reply from {}: {:?}", ip, e);
                RecordOutcome::Malformed
            }
        }
    }

    /// True if `ip` already answered
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.devices.iter().any(|d| d.ip == ip)
    }

    /// Number of devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// True if nothing answered
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Devices in arrival order
    pub fn devices(&self) -> &[DiscoveredDevice] {
        &self.devices
    }

    /// Take the devices
    pub fn into_devices(self) -> Vec<DiscoveredDevice> {
        self.devices
    }
}

/// One-shot discovery run
pub struct DiscoveryService {
    config: DiscoveryConfig,
    phase: DiscoveryPhase,
}

impl DiscoveryService {
    /// Create an idle service
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            phase: DiscoveryPhase::Idle,
        }
    }

    /// Current phase
    pub fn phase(&self) -> DiscoveryPhase {
        self.phase
    }

    /// Settings in use
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Broadcast, collect and return the devices found
    ///
    /// Takes at most `timeout` (or `retries * wait_between` if longer). A
    /// service runs once; later calls fail. Dropping the future closes the
    /// socket.
    pub async fn run(&mut self) -> Result<Vec<DiscoveredDevice>> {
        if self.phase != DiscoveryPhase::Idle {
            return Err(ControlError::DiscoveryError(format!(
                "discovery already {}; create a new service to run again",
                self.phase
            )));
        }

        let result = self.broadcast_and_collect().await;
        self.enter(DiscoveryPhase::Done);
        let devices = result?.into_devices();
        info!("Discovery finished: {} device(s)", devices.len());
        Ok(devices)
    }

    async fn broadcast_and_collect(&mut self) -> Result<DeviceRegistry> {
        let broadcast = match self.config.broadcast {
            Some(addr) => addr,
            None => subnet_broadcast(local_ipv4()?),
        };
        let target = SocketAddr::new(IpAddr::V4(broadcast), self.config.port);

        self.enter(DiscoveryPhase::Broadcasting);
        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0))).await?;
        socket.set_broadcast(true)?;

        let started = Instant::now();
        let mut registry = DeviceRegistry::new();
        let mut buf = vec![0u8; MAX_DATAGRAM];

        for attempt in 1..=self.config.retries {
            match socket.send_to(DISCOVERY_QUERY.as_bytes(), target).await {
                Ok(_) => debug!("Discovery query {} sent to {}", attempt, target),
                Err(e) => warn!("Discovery query {} to {} failed: {}", attempt, target, e),
            }
            let deadline = started + self.config.wait_between.saturating_mul(attempt);
            collect_until(&socket, &mut buf, deadline, &mut registry).await;
        }

        self.enter(DiscoveryPhase::Collecting);
        let deadline = Instant::now() + self.config.collect_window();
        collect_until(&socket, &mut buf, deadline, &mut registry).await;

        Ok(registry)
    }

    fn enter(&mut self, phase: DiscoveryPhase) {
        debug!("Discovery {} -> {}", self.phase, phase);
        self.phase = phase;
    }
}

async fn collect_until(
    socket: &UdpSocket,
    buf: &mut [u8],
    deadline: Instant,
    registry: &mut DeviceRegistry,
) {
    loop {
        match timeout_at(deadline, socket.recv_from(buf)).await {
            Err(_elapsed) => return,
            Ok(Ok((n, from))) => {
                if registry.record(from.ip(), &buf[..n]) == RecordOutcome::Added {
                    info!("Found fixture at {}", from.ip());
                }
            }
            // ICMP unreachable and similar surface here on some platforms
            Ok(Err(e)) => trace!("Discovery receive error: {}", e),
        }
    }
}

/// `a.b.c.255` for an address `a.b.c.d`
pub fn subnet_broadcast(local: Ipv4Addr) -> Ipv4Addr {
    let [a, b, c, _] = local.octets();
    Ipv4Addr::new(a, b, c, 255)
}

/// IPv4 address of the interface that routes to the outside world
///
/// Connecting a UDP socket only selects a route; no packet leaves the host.
pub fn local_ipv4() -> Result<Ipv4Addr> {
    let socket = std::net::UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))?;
    socket.connect(ROUTE_PROBE)?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
        other => Err(ControlError::DiscoveryError(format!(
            "no usable IPv4 outbound interface (got {})",
            other
        ))),
    }
}
