//! Startup and shutdown coordination, and the background worker loop.
//!
//! Cancellation is observed at three points:
//! - the top of every cycle
//! - during every wait between cycles (the wait ends as soon as the token fires)
//! - between download attempts
//!
//! A playlist fetch, a single download attempt or a delivery that is already in
//! flight always runs to completion.

use crate::error::{Error, Result};
use crate::temp_store::cleanup_all;
use crate::types::{EventKind, OrchestratorState, Severity};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::Orchestrator;

impl Orchestrator {
    /// Start the background loop
    ///
    /// Starting while already running is a no-op that emits a warning.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the configuration is invalid; the state stays `Idle`
    /// - [`Error::InvalidState`] while a previous loop is still stopping
    pub async fn start(&self) -> Result<()> {
        let config = self.config().await;
        let mut lifecycle = self.lifecycle.lock().await;

        match lifecycle.state {
            OrchestratorState::Running => {
                self.events
                    .warn(EventKind::Notice, "Already running, start ignored");
                return Ok(());
            }
            OrchestratorState::Stopping => {
                return Err(Error::InvalidState {
                    operation: "start".into(),
                    state: lifecycle.state.to_string(),
                });
            }
            OrchestratorState::Idle => {}
        }

        if let Err(e) = config.validate() {
            self.events
                .error(EventKind::Notice, format!("Cannot start: {}", e));
            return Err(e);
        }

        let cancel = CancellationToken::new();
        lifecycle.state = OrchestratorState::Running;
        lifecycle.cancel = Some(cancel.clone());
        self.events.info(
            EventKind::Started,
            format!(
                "Started, one track every {:?}",
                config.schedule.poll_interval
            ),
        );

        let this = self.clone();
        lifecycle.worker = Some(tokio::spawn(async move { this.run_loop(cancel).await }));
        Ok(())
    }

    /// Ask the background loop to stop
    ///
    /// Returns immediately; the state moves to `Stopping` and back to `Idle` once
    /// the worker has finished its current step. Stopping while idle is a no-op.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        match lifecycle.state {
            OrchestratorState::Running => {
                lifecycle.state = OrchestratorState::Stopping;
                if let Some(cancel) = &lifecycle.cancel {
                    cancel.cancel();
                }
                self.events
                    .info(EventKind::StopRequested, "Stop requested");
            }
            OrchestratorState::Stopping => {
                tracing::debug!("Stop already in progress");
            }
            OrchestratorState::Idle => {
                self.events.warn(EventKind::Notice, "Not running, stop ignored");
            }
        }
    }

    /// Stop the loop, wait for the worker to exit and sweep the scratch directory
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory cannot be listed.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");
        self.stop().await;

        let worker = self.lifecycle.lock().await.worker.take();
        if let Some(worker) = worker
            && let Err(e) = worker.await
        {
            tracing::error!(error = %e, "Worker task ended abnormally");
        }

        {
            // A worker that panicked never reset the state itself
            let mut lifecycle = self.lifecycle.lock().await;
            if lifecycle.state == OrchestratorState::Stopping {
                lifecycle.state = OrchestratorState::Idle;
                lifecycle.cancel = None;
            }
        }

        let config = self.config().await;
        let report = cleanup_all(config.temp_dir()).await?;
        self.events.info(
            EventKind::Cleanup {
                deleted: report.deleted,
                failed: report.failed,
            },
            format!("Removed {} temporary file(s)", report.deleted),
        );

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    async fn run_loop(self, cancel: CancellationToken) {
        tracing::debug!("Worker loop started");

        while !cancel.is_cancelled() {
            let config = self.config().await;

            // Run the cycle as its own task so a panic inside it is caught here
            let cycle = {
                let this = self.clone();
                let config = config.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { this.run_pipeline(&config, &cancel).await })
            };

            let pause = match cycle.await {
                Ok(Ok(_)) => config.schedule.poll_interval,
                Ok(Err(e)) if e.is_source_error() => config.schedule.fetch_cooldown,
                Ok(Err(Error::DownloadFailed { .. } | Error::DeliveryFailed { .. })) => {
                    config.schedule.poll_interval
                }
                Ok(Err(e)) => {
                    self.events.error(
                        EventKind::CycleError,
                        format!("Cycle failed ({}): {}", e.kind_label(), e),
                    );
                    config.schedule.recovery_cooldown
                }
                Err(e) => {
                    self.events
                        .error(EventKind::CycleError, format!("Cycle aborted: {}", e));
                    config.schedule.recovery_cooldown
                }
            };

            if !self.wait(pause, &cancel).await {
                break;
            }
        }

        {
            let mut lifecycle = self.lifecycle.lock().await;
            lifecycle.state = OrchestratorState::Idle;
            lifecycle.cancel = None;
            lifecycle.worker = None;
        }
        self.events.info(EventKind::Stopped, "Stopped");
    }

    /// Sleep for `pause`; returns false if cancelled first
    async fn wait(&self, pause: Duration, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }

        self.events.emit(
            Severity::Debug,
            EventKind::Waiting {
                seconds: pause.as_secs(),
            },
            format!("Next cycle in {:?}", pause),
        );

        tokio::select! {
            _ = tokio::time::sleep(pause) => true,
            _ = cancel.cancelled() => false,
        }
    }
}
