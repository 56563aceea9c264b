use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::loop_worker::{sampling_loop, SamplingContext};
use super::source::DetectionSource;
use super::state::{LoopStatus, TickStats};

/// Owns the single sampling task.
pub struct SensingController {
    handle: Option<JoinHandle<TickStats>>,
    cancel_token: Option<CancellationToken>,
    status_rx: Option<watch::Receiver<LoopStatus>>,
}

impl SensingController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            status_rx: None,
        }
    }

    pub fn start_sensing<S: DetectionSource>(&mut self, ctx: SamplingContext<S>) -> Result<()> {
        if self.handle.is_some() {
            bail!("sensing already active");
        }

        let cancel_token = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(LoopStatus::Running);

        let handle = tokio::spawn(sampling_loop(ctx, cancel_token.clone(), status_tx));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.status_rx = Some(status_rx);
        info!("sensing started");
        Ok(())
    }

    pub fn status(&self) -> LoopStatus {
        self.status_rx
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or_default()
    }

    /// Token that stops the loop when cancelled, e.g. from a signal handler.
    pub fn cancel_token(&self) -> Option<CancellationToken> {
        self.cancel_token.clone()
    }

    /// Resolves once the loop ends on its own (after something else cancelled
    /// its token). Returns immediately when nothing is running.
    pub async fn wait(&mut self) -> Result<TickStats> {
        match self.handle.take() {
            Some(handle) => {
                self.cancel_token = None;
                handle.await.context("sensing loop task failed to join")
            }
            None => Ok(TickStats::default()),
        }
    }

    pub async fn stop_sensing(&mut self) -> Result<TickStats> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.wait().await
    }
}

impl Default for SensingController {
    fn default() -> Self {
        Self::new()
    }
}
