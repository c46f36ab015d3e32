use chrono::{DateTime, Utc};
use trendstitch_types::{Granularity, GranularityRules, StitchError};

use super::calendar::calendar;

/// Outcome of resolving a date range against the granularity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Chosen sampling resolution.
    pub granularity: Granularity,
    /// Record cap per provider window; `None` when unlimited.
    pub max_records: Option<u32>,
    /// Whole periods in `[truncated_start, truncated_end]`.
    pub total_units: i64,
    /// Windows needed to cover the range at `max_records` per window.
    pub blocks_needed: usize,
    /// Start of the period containing the requested start.
    pub truncated_start: DateTime<Utc>,
    /// Start of the last day (or hour) of the period containing the requested end.
    pub truncated_end: DateTime<Utc>,
    /// Whole days between the midnights of start and end.
    pub days_diff: i64,
}

/// Choose a granularity for `[start, end]` and count the windows it needs.
///
/// With `requested` set, the granularity must be present in `rules` and the
/// block count is `ceil(total_units / max_records)` (1 for an unlimited rule).
/// Otherwise the first rule accepting the day span is used and a single block
/// suffices by construction.
///
/// # Errors
/// Returns `StitchError::Planning` when `end < start`, when the requested
/// granularity has no rule, or when a boundary is not representable.
pub fn resolve(
    rules: &GranularityRules,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    requested: Option<Granularity>,
) -> Result<Resolution, StitchError> {
    if end < start {
        return Err(StitchError::planning(format!(
            "end {end} is before start {start}"
        )));
    }
    let days_diff = (end.date_naive() - start.date_naive()).num_days();

    let rule = match requested {
        Some(g) => rules.get(g).ok_or_else(|| {
            StitchError::planning(format!("granularity {g} is not configured"))
        })?,
        None => rules.select(days_diff),
    };

    let cal = calendar(rule.code);
    let truncated_start = cal.period_start(start)?;
    let truncated_end = cal.last_instant(end)?;
    let total_units = cal.units_between(truncated_start, truncated_end);

    let blocks_needed = match (requested, rule.max_records) {
        (Some(_), Some(cap)) => {
            let units = u64::try_from(total_units).unwrap_or(0);
            usize::try_from(units.div_ceil(u64::from(cap)))
                .map_err(|_| StitchError::planning("range needs too many windows"))?
                .max(1)
        }
        _ => 1,
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        granularity = %rule.code,
        days_diff,
        total_units,
        blocks_needed,
        "resolved granularity"
    );

    Ok(Resolution {
        granularity: rule.code,
        max_records: rule.max_records,
        total_units,
        blocks_needed,
        truncated_start,
        truncated_end,
        days_diff,
    })
}
