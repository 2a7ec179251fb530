//! Bounded command hand-off
//!
//! Real-time producers (the audio callback) must never block on the
//! network. They push into a bounded channel and a dedicated thread drains
//! it into a [`CommandSink`]. When the channel is full the oldest pending
//! command is discarded, so the fixture always receives the freshest color.

use super::sender::CommandSink;
use crate::{error::ControlError, Result};
use ambilight_core::ColorCommand;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// Create a queue holding at most `capacity` pending commands
///
/// A zero capacity is raised to one.
pub fn command_queue(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let (tx, rx) = bounded(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    (
        CommandProducer {
            tx,
            rx: rx.clone(),
            dropped: dropped.clone(),
        },
        CommandConsumer { rx, dropped },
    )
}

/// Non-blocking producer side
///
/// Dropping every producer stops the sender thread once the queue drains.
#[derive(Clone)]
pub struct CommandProducer {
    tx: Sender<ColorCommand>,
    // Used only to evict the oldest entry when full
    rx: Receiver<ColorCommand>,
    dropped: Arc<AtomicU64>,
}

impl CommandProducer {
    /// Enqueue a command, evicting the oldest pending one if full
    ///
    /// Returns `false` only if the consumer side is gone.
    pub fn push(&self, command: ColorCommand) -> bool {
        let mut pending = command;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return true,
                Err(TrySendError::Full(back)) => {
                    pending = back;
                    match self.rx.try_recv() {
                        Ok(_) => {
                            self.dropped.fetch_add(1, Ordering::Relaxed);
                        }
                        // Consumer drained it meanwhile
                        Err(TryRecvError::Empty) => {}
                        Err(TryRecvError::Disconnected) => return false,
                    }
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
    }

    /// Commands currently waiting
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// True if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Commands evicted so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Receiving side, turned into a thread by [`spawn`](Self::spawn)
pub struct CommandConsumer {
    rx: Receiver<ColorCommand>,
    dropped: Arc<AtomicU64>,
}

/// Counters reported when the sender thread exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// Commands handed to the sink successfully
    pub sent: u64,
    /// Commands the sink rejected
    pub failed: u64,
    /// Commands evicted before sending
    pub dropped: u64,
}

impl CommandConsumer {
    /// Start the `wiz-sender` thread draining into `sink`
    pub fn spawn<S>(self, mut sink: S) -> Result<SenderHandle>
    where
        S: CommandSink + 'static,
    {
        let CommandConsumer { rx, dropped } = self;
        let handle = std::thread::Builder::new()
            .name("wiz-sender".to_string())
            .spawn(move || {
                let mut stats = SenderStats::default();
                for command in rx.iter() {
                    match sink.send(&command) {
                        Ok(()) => stats.sent += 1,
                        Err(e) => {
                            // Next command supersedes this one
                            stats.failed += 1;
                            warn!("Failed to send {}: {}", command, e);
                        }
                    }
                }
                stats.dropped = dropped.load(Ordering::Relaxed);
                debug!(
                    "wiz-sender finished: sent={}, failed={}, dropped={}",
                    stats.sent, stats.failed, stats.dropped
                );
                stats
            })?;
        Ok(SenderHandle { handle })
    }
}

/// Running sender thread
pub struct SenderHandle {
    handle: JoinHandle<SenderStats>,
}

impl SenderHandle {
    /// Wait for the thread to drain and exit
    ///
    /// Only returns once every [`CommandProducer`] has been dropped.
    pub fn join(self) -> Result<SenderStats> {
        self.handle
            .join()
            .map_err(|_| ControlError::SenderError("wiz-sender thread panicked".to_string()))
    }

    /// True once the thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
