use chrono::{DateTime, Utc};
use trendstitch_core::{Granularity, StitchError, TimeSeries, calendar, observed_granularity};

use super::fetch::Window;
use super::session::Session;
use crate::Stitcher;

impl Stitcher {
    /// Fetch exactly one provider-legal window of `granularity` starting at
    /// the period containing `start`.
    ///
    /// The window spans the rule's full record cap. The returned series must
    /// be sampled at `granularity` and hold exactly that many records.
    ///
    /// # Errors
    /// Returns `Planning` for a granularity without a rule or with an
    /// unlimited rule, `Fetch` when every provider fails, and `Data` when the
    /// cadence or record count of the result does not match.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "trendstitch::fetch_max_window",
            skip(self),
            fields(granularity = %granularity),
        )
    )]
    pub async fn fetch_max_window(
        &self,
        term: &str,
        start: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<TimeSeries, StitchError> {
        let rule = self.cfg.rules.get(granularity).ok_or_else(|| {
            StitchError::planning(format!("granularity {granularity} is not configured"))
        })?;
        let Some(cap) = rule.max_records else {
            return Err(StitchError::planning(format!(
                "granularity {granularity} has no record limit; nothing to maximise"
            )));
        };
        let cal = calendar(granularity);
        let window_start = cal.period_start(start)?;
        let window = Window {
            start: window_start,
            end: cal.window_end(window_start, cap)?,
            block_index: None,
        };

        let fetchers = self.ordered()?;
        let mut session = Session::new(term, None);
        let series = self
            .fetch_window(&mut session, &fetchers, window, granularity)
            .await?;
        let _ = session.finish();

        match observed_granularity(&series) {
            Some(g) if g == granularity => {}
            other => {
                return Err(StitchError::data(format!(
                    "expected {granularity} data, got {}",
                    other.map_or_else(|| "no cadence".to_string(), |g| g.to_string())
                )));
            }
        }
        let expected = usize::try_from(cap).unwrap_or(usize::MAX);
        if series.len() != expected {
            return Err(StitchError::data(format!(
                "expected {expected} records, got {}",
                series.len()
            )));
        }
        Ok(series)
    }
}
