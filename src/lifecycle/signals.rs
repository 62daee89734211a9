//! OS signal handling.
//!
//! Translates SIGINT into the internal shutdown signal. The loop finishes
//! its in-flight submission before stopping, so an accepted transaction
//! is never left unaccounted for in the logs.

use crate::lifecycle::shutdown::Shutdown;

/// Spawn the signal listener. The task lives until the process exits.
pub fn spawn_signal_listener(shutdown: Shutdown) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, stopping after the in-flight submission");
                shutdown.trigger();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for interrupt signal");
            }
        }
    });
}
