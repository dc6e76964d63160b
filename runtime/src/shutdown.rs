//! Cooperative shutdown signalling between the server and its long-running tasks.
//!
//! The server owns a [`ShutdownTrigger`]; every task (HTTP server, event consumer)
//! holds a cloned [`ShutdownSignal`] and stops taking new work once it fires.
//!
//! ```rust
//! use order_ledger_runtime::shutdown::shutdown_channel;
//!
//! # async fn example() {
//! let (trigger, mut signal) = shutdown_channel();
//! let task = tokio::spawn(async move { signal.wait().await });
//!
//! trigger.trigger();
//! task.await.unwrap();
//! # }
//! ```

use tokio::sync::watch;

/// Create a connected trigger/signal pair.
#[must_use]
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

/// Fires the shutdown signal. Dropping it also releases every waiting task.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Ask every holder of a [`ShutdownSignal`] to stop.
    pub fn trigger(&self) {
        tracing::info!("Shutdown requested");
        metrics::counter!("shutdown_requested_total").increment(1);
        self.tx.send_replace(true);
    }

    /// Another signal connected to this trigger.
    #[must_use]
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Resolves once shutdown has been requested.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Whether shutdown has already been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until shutdown is requested or the trigger is dropped.
    pub async fn wait(&mut self) {
        // An Err means the trigger was dropped, which also means stop.
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_releases_all_signals() {
        let (trigger, signal) = shutdown_channel();
        let mut first = signal.clone();
        let mut second = trigger.subscribe();

        assert!(!signal.is_triggered());
        trigger.trigger();

        tokio::time::timeout(Duration::from_secs(1), first.wait())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), second.wait())
            .await
            .unwrap();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_dropping_trigger_releases_signal() {
        let (trigger, mut signal) = shutdown_channel();
        drop(trigger);

        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_signal_pending_until_triggered() {
        let (_trigger, mut signal) = shutdown_channel();

        let waited = tokio::time::timeout(Duration::from_millis(20), signal.wait()).await;

        assert!(waited.is_err());
    }
}
