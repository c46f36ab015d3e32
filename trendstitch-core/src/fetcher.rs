use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::StitchError;
pub use trendstitch_types::FetcherKey;
use trendstitch_types::TimeSeries;

/// A data source that returns one bounded window of interest-over-time data.
///
/// Implementations perform a single request per call and never retry; the
/// orchestrator handles fallback between fetchers and pacing between calls.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Stable identifier used in provider policies and attempt logs.
    fn name(&self) -> &'static str;

    /// Canonical fetcher key constructed from the static name.
    fn key(&self) -> FetcherKey {
        FetcherKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Whether the fetcher can be called at all (for example, a required
    /// credential is configured). Unavailable fetchers are skipped.
    fn is_available(&self) -> bool {
        true
    }

    /// Fetch `term` between `start` and `end` inclusive.
    ///
    /// The returned series is expected to be sampled at the resolution the
    /// provider chooses for the span; the caller validates it.
    async fn fetch(
        &self,
        term: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeries, StitchError>;
}
