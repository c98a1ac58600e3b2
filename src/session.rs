//! The single active run.
//!
//! A [`Session`] holds the selected [`SourceAsset`], the cancellation token
//! of the run in flight, and the last [`BatchResult`]. Starting a new run or
//! selecting a new source cancels whatever was running before, so at most
//! one run is ever active. Each run is identified by the token
//! [`Session::begin_run`] hands out; results reported under a superseded
//! token are dropped.

use crate::{output::BatchResult, progress::CancellationToken, source::SourceAsset};

/// Tracks the current source, the active run, and its result.
#[derive(Debug, Default)]
pub struct Session {
    source: Option<SourceAsset>,
    active: Option<CancellationToken>,
    batch: Option<BatchResult>,
}

impl Session {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the source. Any run in flight is cancelled and the previous
    /// batch is discarded.
    pub fn select_source(&mut self, asset: SourceAsset) {
        self.cancel_active();
        self.batch = None;
        if let Some(previous) = self.source.replace(asset) {
            log::debug!("Released {}", previous.display_name());
        }
    }

    /// Start a new run and return its cancellation token. The previous
    /// run's token is cancelled.
    pub fn begin_run(&mut self) -> CancellationToken {
        self.cancel_active();
        let token = CancellationToken::new();
        self.active = Some(token.clone());
        token
    }

    /// Store the result of the run identified by `token`, replacing any
    /// earlier batch.
    ///
    /// Returns `false` and discards `batch` if `token` is not the active
    /// run's, i.e. the run was superseded, cancelled through the session, or
    /// already finished.
    pub fn finish_run(&mut self, token: &CancellationToken, batch: BatchResult) -> bool {
        if !self
            .active
            .as_ref()
            .is_some_and(|active| active.same_token(token))
        {
            log::debug!("Dropped result of a superseded run ({} outputs)", batch.len());
            return false;
        }
        self.active = None;
        self.batch = Some(batch);
        true
    }

    /// Cancel the run in flight, if any.
    pub fn cancel(&mut self) {
        self.cancel_active();
    }

    /// Return to the initial state, releasing the source.
    pub fn reset(&mut self) {
        self.cancel_active();
        self.source = None;
        self.batch = None;
    }

    /// The selected source.
    pub fn source(&self) -> Option<&SourceAsset> {
        self.source.as_ref()
    }

    /// The last finished batch.
    pub fn batch(&self) -> Option<&BatchResult> {
        self.batch.as_ref()
    }

    /// `true` while a run is in flight.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    fn cancel_active(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }
}
