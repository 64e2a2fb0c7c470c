//! Completion-polling gate
//!
//! While a training job is in flight the controller needs to be woken at
//! a fixed cadence to check on it. The gate owns that schedule: `open`
//! spawns a tokio interval task driving the supplied tick future, and
//! `close` cancels it. Both are idempotent; cancellation stops future
//! wakeups but never aborts the external training job itself.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Idempotent enable/disable switch for completion polling
pub struct PollingGate {
    interval: Duration,
    token: Mutex<Option<CancellationToken>>,
}

impl PollingGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            token: Mutex::new(None),
        }
    }

    /// Open the gate, spawning the polling task if it isn't running
    ///
    /// `tick` produces the future run on every wakeup. Calling `open` on
    /// an already-open gate is a no-op.
    pub fn open<F, Fut>(&self, tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let mut guard = self.token.lock().expect("gate lock poisoned");
        if guard.as_ref().is_some_and(|t| !t.is_cancelled()) {
            tracing::debug!("Polling gate already open");
            return;
        }

        let token = CancellationToken::new();
        *guard = Some(token.clone());

        let interval = self.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first interval tick fires immediately; skip it so the
            // first poll happens one full interval after submission.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!("Polling gate closed; stopping poll task");
                        break;
                    }
                    _ = ticker.tick() => {
                        tick().await;
                    }
                }
            }
        });

        tracing::info!(interval_secs = interval.as_secs(), "Polling gate opened");
    }

    /// Close the gate, cancelling the polling task
    ///
    /// Calling `close` on an already-closed gate is a no-op.
    pub fn close(&self) {
        let mut guard = self.token.lock().expect("gate lock poisoned");
        match guard.take() {
            Some(token) => {
                token.cancel();
                tracing::info!("Polling gate closed");
            }
            None => tracing::debug!("Polling gate already closed"),
        }
    }

    /// Whether the gate is currently open
    pub fn is_open(&self) -> bool {
        self.token
            .lock()
            .expect("gate lock poisoned")
            .as_ref()
            .is_some_and(|t| !t.is_cancelled())
    }
}
