//! Cooperative cancellation
//!
//! The trigger owns the only sender of a channel that never carries a
//! message; dropping it disconnects every listener at once.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Fires the shutdown, once
pub struct ShutdownTrigger {
    _tx: Sender<()>,
}

/// Observes the shutdown; cheap to clone
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: Receiver<()>,
}

/// Create a linked trigger and signal
pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = bounded(0);
    (ShutdownTrigger { _tx: tx }, ShutdownSignal { rx })
}

impl ShutdownTrigger {
    /// Request shutdown
    pub fn trigger(self) {
        drop(self);
    }
}

impl ShutdownSignal {
    /// True once the trigger has fired
    pub fn is_triggered(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Sleep for `timeout` or until shutdown; returns true on shutdown
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.rx.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }

    /// Block until shutdown
    pub fn wait(&self) {
        let _ = self.rx.recv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_untriggered_signal_sleeps() {
        let (_trigger, signal) = channel();
        assert!(!signal.is_triggered());
        let started = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(20)));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_trigger_wakes_every_listener() {
        let (trigger, signal) = channel();
        let other = signal.clone();
        let waiter = std::thread::spawn(move || other.wait_timeout(Duration::from_secs(10)));

        trigger.trigger();
        assert!(waiter.join().unwrap());
        assert!(signal.is_triggered());
        assert!(signal.wait_timeout(Duration::from_secs(10)));
        signal.wait();
    }
}
