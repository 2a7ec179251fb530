//! Visual mode loop
//!
//! Strictly sequential: grab, process, send, sleep. Capture and send faults
//! skip the frame; the next iteration supersedes it. Shutdown is checked
//! between iterations only, so a command is never half emitted.

use crate::shutdown::ShutdownSignal;
use ambilight_control::CommandSink;
use ambilight_core::{ColorCommand, ColorPipeline, FrameSource};
use tracing::{debug, info, warn};

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Commands emitted
    pub frames: u64,
    /// Iterations lost to capture failures
    pub capture_errors: u64,
    /// Commands the sink rejected
    pub send_errors: u64,
}

pub struct VisualRunner<S, K> {
    pipeline: ColorPipeline,
    source: S,
    sink: K,
    stats: RunStats,
    failing: bool,
}

impl<S: FrameSource, K: CommandSink> VisualRunner<S, K> {
    pub fn new(pipeline: ColorPipeline, source: S, sink: K) -> Self {
        Self {
            pipeline,
            source,
            sink,
            stats: RunStats::default(),
            failing: false,
        }
    }

    /// Loop until `shutdown` fires
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> RunStats {
        let interval = self.pipeline.profile().frame_interval;
        info!(
            "{} loop started ({} ms per frame)",
            self.pipeline.profile().mode,
            interval.as_millis()
        );

        while !shutdown.is_triggered() {
            self.iterate();
            if shutdown.wait_timeout(interval) {
                break;
            }
        }

        info!(
            "{} loop stopped: {} frames, {} capture errors, {} send errors",
            self.pipeline.profile().mode,
            self.stats.frames,
            self.stats.capture_errors,
            self.stats.send_errors
        );
        self.stats
    }

    /// One grab-process-send step
    pub fn iterate(&mut self) -> Option<ColorCommand> {
        let command = match self.capture_and_process() {
            Ok(command) => command,
            Err(e) => {
                self.stats.capture_errors += 1;
                if !self.failing {
                    warn!("Frame capture failed: {}", e);
                    self.failing = true;
                } else {
                    debug!("Frame capture still failing: {}", e);
                }
                return None;
            }
        };
        if self.failing {
            info!("Frame capture recovered");
            self.failing = false;
        }

        match self.sink.send(&command) {
            Ok(()) => self.stats.frames += 1,
            Err(e) => {
                self.stats.send_errors += 1;
                warn!("Failed to send {}: {}", command, e);
            }
        }
        Some(command)
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    fn capture_and_process(&mut self) -> ambilight_core::Result<ColorCommand> {
        let display = self.source.display_size()?;
        let region = self.pipeline.capture_region(display);
        let frame = self.source.grab(region)?;
        Ok(self.pipeline.process_region(&frame))
    }
}
