use std::sync::Arc;

use chrono::{DateTime, Utc};
use trendstitch_core::{
    Fetcher, Granularity, StitchError, TimeSeries, calendar, observed_granularity,
};

use super::session::Session;
use super::util::collapse_errors;
use crate::Stitcher;
use crate::core::tag_err;

const DRY_RUN_PROVIDER: &str = "dry-run";

/// One planned window handed to the fetch loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub block_index: Option<usize>,
}

/// Zero-valued series with one point per period of `granularity` in `[start, end]`.
pub(crate) fn zero_fill(
    granularity: Granularity,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<TimeSeries, StitchError> {
    let cal = calendar(granularity);
    let mut ts = cal.period_start(start)?;
    let mut points = Vec::new();
    while ts <= end {
        points.push((ts, 0.0));
        ts = cal.shift(ts, 1)?;
    }
    TimeSeries::new(points)
}

impl Stitcher {
    /// Fetch one window, falling back through `fetchers` in order.
    ///
    /// Every attempt and skip is appended to the session log, together with
    /// the resolution each successful provider returned. When every provider fails the collapsed error is wrapped
    /// in `StitchError::Fetch` naming the window.
    pub(crate) async fn fetch_window(
        &self,
        session: &mut Session<'_>,
        fetchers: &[Arc<dyn Fetcher>],
        window: Window,
        expected: Granularity,
    ) -> Result<TimeSeries, StitchError> {
        if self.cfg.dry_run {
            let series = zero_fill(expected, window.start, window.end)?;
            let mut rec = session.record(window.start, window.end, window.block_index);
            rec.provider_used = Some(DRY_RUN_PROVIDER.to_string());
            rec.observed_granularity = Some(expected);
            session.push(rec);
            return Ok(series);
        }

        let mut attempted_any = false;
        let mut errors: Vec<StitchError> = Vec::new();
        for f in fetchers {
            let mut rec = session.record(window.start, window.end, window.block_index);
            rec.provider_used = Some(f.name().to_string());
            if !f.is_available() {
                #[cfg(feature = "tracing")]
                tracing::warn!(provider = f.name(), "provider unavailable; skipped");
                rec.error = Some(StitchError::provider(f.name(), "unavailable"));
                session.push(rec);
                continue;
            }
            attempted_any = true;
            session.pace(self.cfg.request_delay).await;

            let term = session.term().to_string();
            let result = Self::provider_call_with_timeout(
                f.name(),
                self.cfg.provider_timeout,
                f.fetch(&term, window.start, window.end),
            )
            .await
            .map_err(|e| tag_err(f.name(), e));

            match result {
                Ok(series) => {
                    rec.observed_granularity = observed_granularity(&series);
                    session.push(rec);
                    return Ok(series);
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(provider = f.name(), error = %e, "provider fetch failed");
                    rec.error = Some(e.clone());
                    session.push(rec);
                    errors.push(e);
                }
            }
        }

        Err(StitchError::fetch(
            window.block_index.unwrap_or(0),
            window.start,
            window.end,
            collapse_errors(attempted_any, errors),
        ))
    }
}
