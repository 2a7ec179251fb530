//! Ambilight - drive a WiZ light from screen content or live audio

mod audio;
mod capture;
mod cli;
mod config;
mod logging_setup;
mod loops;
mod shutdown;

use crate::audio::AudioCapability;
use crate::capture::ImageFileSource;
use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::loops::VisualRunner;
use ambilight_control::{DiscoveryService, UdpCommandSender};
use ambilight_core::{ColorPipeline, Mode, ModeProfile};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let _log_guard = logging_setup::init(&config.logging)?;

    match cli.command {
        Commands::Run { mode, ip, image } => {
            if let Some(ip) = ip {
                config.device.ip = Some(ip);
            }
            if let Some(image) = image {
                config.capture.image = Some(image);
            }
            run(config, mode).await
        }
        Commands::Discover {
            timeout,
            retries,
            json,
        } => {
            if let Some(timeout) = timeout {
                config.discovery.timeout_secs = timeout;
            }
            if let Some(retries) = retries {
                config.discovery.retries = retries;
            }
            discover(&config, json).await
        }
        Commands::Profiles => {
            for profile in config.profiles()?.iter() {
                println!("{}", profile);
            }
            Ok(())
        }
    }
}

async fn run(config: AppConfig, mode: Mode) -> Result<()> {
    let target = config
        .device
        .target()
        .ok_or_else(|| anyhow!("No fixture IP configured; pass --ip or run `ambilight discover`"))?;
    let profiles = config.profiles()?;

    info!("Starting Ambilight in {} mode -> {}", mode, target);

    let (trigger, signal) = shutdown::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, shutting down"),
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
        trigger.trigger();
    });

    if mode.is_visual() {
        let image = config
            .capture
            .image
            .clone()
            .ok_or_else(|| anyhow!("No capture image configured; pass --image or set capture.image"))?;
        run_visual(profiles.get(mode).clone(), image, target, signal).await
    } else {
        run_sound(&config, target, signal).await
    }
}

async fn run_visual(
    profile: ModeProfile,
    image: PathBuf,
    target: SocketAddr,
    signal: shutdown::ShutdownSignal,
) -> Result<()> {
    let pipeline = ColorPipeline::new(profile)?;
    let sender = UdpCommandSender::with_target(target)?;
    info!("Capturing from {:?}", image);

    let mut runner = VisualRunner::new(pipeline, ImageFileSource::new(image), sender);
    let stats = tokio::task::spawn_blocking(move || runner.run(&signal))
        .await
        .context("Visual loop panicked")?;
    info!("Session ended after {} frames", stats.frames);
    Ok(())
}

#[cfg(feature = "audio")]
async fn run_sound(
    config: &AppConfig,
    target: SocketAddr,
    signal: shutdown::ShutdownSignal,
) -> Result<()> {
    use crate::loops::SoundBlockHandler;
    use ambilight_control::command_queue;

    let device = match audio::probe() {
        AudioCapability::Available { device } => device,
        AudioCapability::Unavailable { reason } => {
            bail!("Sound mode is unavailable: {}", reason)
        }
    };
    info!("Sound mode using input device {}", device);

    let sound = &config.sound;
    let (producer, consumer) = command_queue(sound.queue_capacity);
    let sender = consumer.spawn(UdpCommandSender::with_target(target)?)?;

    let mut handler =
        SoundBlockHandler::new(sound.block_size, sound.sample_rate, sound.brightness, producer);
    let input = audio::start_input(sound, move |block| {
        handler.handle_block(block);
    })?;

    info!("Listening to audio... Press Ctrl+C to stop.");
    tokio::task::spawn_blocking(move || signal.wait())
        .await
        .context("Shutdown wait panicked")?;

    // Dropping the stream drops the handler and with it the last producer
    drop(input);
    let stats = sender.join()?;
    info!(
        "Session ended: {} sent, {} failed, {} dropped",
        stats.sent, stats.failed, stats.dropped
    );
    Ok(())
}

#[cfg(not(feature = "audio"))]
async fn run_sound(
    _config: &AppConfig,
    _target: SocketAddr,
    _signal: shutdown::ShutdownSignal,
) -> Result<()> {
    match audio::probe() {
        AudioCapability::Unavailable { reason } => bail!("Sound mode is unavailable: {}", reason),
        AudioCapability::Available { device } => {
            bail!("Sound mode cannot use {} in this build", device)
        }
    }
}

async fn discover(config: &AppConfig, json: bool) -> Result<()> {
    let discovery = config.discovery.to_discovery_config(config.device.port)?;
    let budget = discovery
        .timeout
        .max(discovery.wait_between.saturating_mul(discovery.retries));
    info!(
        "Discovering fixtures for up to {:.1} s (Ctrl+C to stop)",
        budget.as_secs_f64()
    );

    let mut service = DiscoveryService::new(discovery);
    let devices = tokio::select! {
        result = service.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Discovery interrupted");
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else if devices.is_empty() {
        println!("No fixtures found");
    } else {
        for device in &devices {
            println!("{:<15} {}", device.ip.to_string(), display_name(&device.name));
        }
    }
    Ok(())
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(unnamed)"
    } else {
        name
    }
}
