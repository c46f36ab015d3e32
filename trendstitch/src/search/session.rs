use std::time::Duration;

use chrono::{DateTime, Utc};
use trendstitch_core::{AttemptRecord, StitchWarning};

use super::phase::SearchPhase;

/// Receives attempt-log records as they are written.
///
/// Observers are injected per call (see `Stitcher::search_with_observer`) and
/// are invoked synchronously on the searching task.
pub trait AttemptObserver: Send + Sync {
    /// Called once per appended record.
    fn on_attempt(&self, record: &AttemptRecord);

    /// Called on every phase transition.
    fn on_phase(&self, _phase: SearchPhase) {}
}

/// Per-call state: phase, attempt log, warnings and the provider call count
/// that drives the inter-fetch delay.
pub(crate) struct Session<'a> {
    term: String,
    phase: SearchPhase,
    log: Vec<AttemptRecord>,
    warnings: Vec<StitchWarning>,
    calls: usize,
    observer: Option<&'a dyn AttemptObserver>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(term: &str, observer: Option<&'a dyn AttemptObserver>) -> Self {
        Self {
            term: term.to_string(),
            phase: SearchPhase::Planning,
            log: Vec::new(),
            warnings: Vec::new(),
            calls: 0,
            observer,
        }
    }

    pub(crate) fn term(&self) -> &str {
        &self.term
    }

    pub(crate) fn advance(&mut self, next: SearchPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal phase transition {} -> {next}",
            self.phase
        );
        #[cfg(feature = "tracing")]
        tracing::debug!(term = %self.term, from = %self.phase, to = %next, "search phase");
        self.phase = next;
        if let Some(obs) = self.observer {
            obs.on_phase(next);
        }
    }

    /// Blank record for a planned window of this search.
    pub(crate) fn record(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        block_index: Option<usize>,
    ) -> AttemptRecord {
        AttemptRecord::planned(self.term.clone(), start, end, block_index)
    }

    pub(crate) fn push(&mut self, record: AttemptRecord) {
        if let Some(w) = &record.warning {
            #[cfg(feature = "tracing")]
            tracing::warn!(term = %self.term, warning = %w, "search warning");
            if !self.warnings.contains(w) {
                self.warnings.push(w.clone());
            }
        }
        if let Some(obs) = self.observer {
            obs.on_attempt(&record);
        }
        self.log.push(record);
    }

    /// Sleep for `delay` unless this is the first provider call of the search.
    pub(crate) async fn pace(&mut self, delay: Duration) {
        if self.calls > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.calls += 1;
    }

    /// Emit one summary line per record and hand back the log and warnings.
    pub(crate) fn finish(self) -> (Vec<AttemptRecord>, Vec<StitchWarning>) {
        #[cfg(feature = "tracing")]
        for r in &self.log {
            let provider = r.provider_used.as_deref().unwrap_or("-");
            let observed = r
                .observed_granularity
                .map_or_else(|| "-".to_string(), |g| g.to_string());
            match (&r.error, &r.warning) {
                (Some(e), _) => tracing::info!(
                    term = %r.term,
                    start = %r.planned_start,
                    end = %r.planned_end,
                    provider,
                    error = %e,
                    "search summary"
                ),
                (None, Some(w)) => tracing::info!(
                    term = %r.term,
                    start = %r.planned_start,
                    end = %r.planned_end,
                    provider,
                    observed = %observed,
                    warning = %w,
                    "search summary"
                ),
                (None, None) => tracing::info!(
                    term = %r.term,
                    start = %r.planned_start,
                    end = %r.planned_end,
                    provider,
                    observed = %observed,
                    "search summary"
                ),
            }
        }
        (self.log, self.warnings)
    }
}
