//! Graceful shutdown coordination.
//!
//! Background tasks (worker loops, heartbeat) subscribe to a shared signal;
//! the coordinator flips it on SIGINT/SIGTERM or on an explicit trigger so
//! every loop exits cleanly instead of being torn down with the process.

use tokio::signal;
use tokio::sync::watch;
use tracing::info;

/// Owns the shutdown state and hands out subscriber signals.
pub struct ShutdownCoordinator {
    watch_tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (watch_tx, _) = watch::channel(false);
        Self { watch_tx }
    }

    /// Subscribe a task to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            watch_rx: self.watch_tx.subscribe(),
        }
    }

    /// Initiate shutdown for all subscribers.
    pub fn trigger(&self) {
        let _ = self.watch_tx.send(true);
    }

    /// Spawn a listener that triggers shutdown on SIGINT or SIGTERM.
    pub fn spawn_signal_listener(&self) {
        let watch_tx = self.watch_tx.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("Shutdown signal received");
            let _ = watch_tx.send(true);
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle a background task selects on.
#[derive(Clone)]
pub struct ShutdownSignal {
    watch_rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Whether shutdown has been initiated.
    pub fn is_shutdown(&self) -> bool {
        *self.watch_rx.borrow()
    }

    /// Resolve once shutdown is initiated.
    pub async fn recv(&mut self) {
        let _ = self.watch_rx.wait_for(|v| *v).await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => return signal::ctrl_c().await.unwrap_or(()),
    };
    tokio::select! {
        _ = signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = signal::ctrl_c().await;
}
