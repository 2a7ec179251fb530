//! Command-line interface

use ambilight_core::Mode;
use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ambilight")]
#[command(about = "Drive a WiZ light from screen content or live audio", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (RUST_LOG still wins)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream colors to a fixture until interrupted
    Run {
        /// ambient, gaming, movie or sound
        #[arg(short, long, default_value = "gaming")]
        mode: Mode,

        /// Fixture IP address
        #[arg(long)]
        ip: Option<IpAddr>,

        /// Image file the capture source re-reads every frame
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Find fixtures on the local subnet
    Discover {
        /// Total wait in seconds
        #[arg(long)]
        timeout: Option<f64>,

        /// Number of broadcasts
        #[arg(long)]
        retries: Option<u32>,

        /// Print devices as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective tunables of every mode
    Profiles,
}
