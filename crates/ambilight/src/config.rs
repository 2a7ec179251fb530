//! Application configuration
//!
//! Everything is optional; a missing file means built-in defaults. Command
//! line flags are applied on top by the caller.

use ambilight_control::{DiscoveryConfig, DEFAULT_PORT};
use ambilight_core::audio::{DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE, DEFAULT_SOUND_BRIGHTNESS};
use ambilight_core::{Mode, ModeOverrides, ModeProfiles};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub discovery: DiscoverySettings,
    pub sound: SoundSettings,
    pub logging: LogConfig,
    pub capture: CaptureConfig,
    /// Per-mode overrides keyed by mode name
    pub modes: BTreeMap<String, ModeOverrides>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub ip: Option<IpAddr>,
    pub port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            ip: None,
            port: DEFAULT_PORT,
        }
    }
}

impl DeviceConfig {
    /// Fixture address, if an IP is known
    pub fn target(&self) -> Option<SocketAddr> {
        self.ip.map(|ip| SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverySettings {
    pub retries: u32,
    pub wait_between_secs: f64,
    pub timeout_secs: f64,
    pub broadcast: Option<Ipv4Addr>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        let defaults = DiscoveryConfig::default();
        Self {
            retries: defaults.retries,
            wait_between_secs: defaults.wait_between.as_secs_f64(),
            timeout_secs: defaults.timeout.as_secs_f64(),
            broadcast: defaults.broadcast,
        }
    }
}

impl DiscoverySettings {
    /// Discovery settings for fixtures listening on `port`
    pub fn to_discovery_config(&self, port: u16) -> Result<DiscoveryConfig> {
        Ok(DiscoveryConfig {
            retries: self.retries,
            wait_between: seconds("discovery.wait_between_secs", self.wait_between_secs)?,
            timeout: seconds("discovery.timeout_secs", self.timeout_secs)?,
            port,
            broadcast: self.broadcast,
        })
    }
}

fn seconds(key: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("{} must be a non-negative number of seconds, got {}", key, secs))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoundSettings {
    pub sample_rate: u32,
    pub block_size: usize,
    pub brightness: u8,
    pub queue_capacity: usize,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            brightness: DEFAULT_SOUND_BRIGHTNESS,
            queue_capacity: 8,
        }
    }
}

/// Logging destinations and verbosity
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// trace, debug, info, warn, error or off
    pub level: String,
    /// Log to stderr
    pub console: bool,
    /// Also log to this file
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            file: None,
        }
    }
}

impl LogConfig {
    /// Default level for the filter; unknown names fall back to INFO
    pub fn parse_level(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create the directory holding the log file
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        match self.file.as_deref().and_then(Path::parent) {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Image file standing in for the display
    pub image: Option<PathBuf>,
}

impl AppConfig {
    /// Read `path`, or return defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Built-in profiles with the `[modes.*]` overrides applied and validated
    pub fn profiles(&self) -> Result<ModeProfiles> {
        let mut overrides = Vec::with_capacity(self.modes.len());
        for (name, o) in &self.modes {
            let mode: Mode = name
                .parse()
                .with_context(|| format!("Invalid [modes.{}] section", name))?;
            overrides.push((mode, o));
        }
        Ok(ModeProfiles::with_overrides(overrides)?)
    }
}
