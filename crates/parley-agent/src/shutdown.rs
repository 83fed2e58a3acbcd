// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! SIGTERM and SIGINT (Ctrl+C) cancel a process-wide [`CancellationToken`].
//! Every in-flight turn runs under a child of that token, so a shutdown
//! aborts generation without persisting partial replies.

use std::time::Duration;

use parley_core::ParleyError;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Installs handlers for SIGTERM and SIGINT.
///
/// Returns a token that is cancelled when either signal arrives. Must be
/// called from within a Tokio runtime.
pub fn install_signal_handler() -> Result<CancellationToken, ParleyError> {
    let token = CancellationToken::new();
    let trigger = token.clone();

    #[cfg(unix)]
    let mut sigterm = {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::terminate())
            .map_err(|e| ParleyError::Internal(format!("failed to install SIGTERM handler: {e}")))?
    };

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        tokio::select! {
            _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
            _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
            _ = trigger.cancelled() => {}
        }

        #[cfg(not(unix))]
        tokio::select! {
            _ = ctrl_c => info!("received Ctrl+C, initiating shutdown"),
            _ = trigger.cancelled() => {}
        }

        trigger.cancel();
        debug!("shutdown signal handler completed");
    });

    Ok(token)
}

/// Waits up to `timeout` for tracked turn tasks to finish.
///
/// Turns observe the cancelled shutdown token and wind down on their own;
/// this only bounds how long the process waits for them.
pub async fn drain_turns(tracker: &TaskTracker, timeout: Duration) {
    tracker.close();
    if tracker.is_empty() {
        info!("no in-flight turns to drain");
        return;
    }

    info!(count = tracker.len(), "waiting for in-flight turns to finish");
    if tokio::time::timeout(timeout, tracker.wait()).await.is_ok() {
        info!("all turns drained");
    } else {
        warn!(remaining = tracker.len(), "drain timeout reached, abandoning turns");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_live_token() {
        let token = install_signal_handler().unwrap();
        assert!(!token.is_cancelled());
        // Cancelling manually also stops the background task.
        token.cancel();
    }

    #[tokio::test]
    async fn drain_with_no_turns_returns_immediately() {
        let tracker = TaskTracker::new();
        drain_turns(&tracker, Duration::from_secs(30)).await;
        assert!(tracker.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_tracked_turns() {
        let tracker = TaskTracker::new();
        tracker.spawn(async {
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        drain_turns(&tracker, Duration::from_secs(10)).await;
        assert!(tracker.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn drain_gives_up_after_timeout() {
        let tracker = TaskTracker::new();
        tracker.spawn(std::future::pending::<()>());

        drain_turns(&tracker, Duration::from_secs(1)).await;
        assert_eq!(tracker.len(), 1);
    }
}
