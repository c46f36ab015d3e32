//! Window planning: split a range into provider-legal windows, optionally
//! over-sampled by staggered groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trendstitch_types::{Granularity, StitchError, WindowRef};

use crate::granularity::calendar;

/// One provider fetch window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBlock {
    /// Window start (period start).
    pub start: DateTime<Utc>,
    /// Start of the window's last day or hour.
    pub end: DateTime<Utc>,
    /// Stagger group the window belongs to.
    pub group_index: usize,
    /// Position inside the group.
    pub interval_index: usize,
}

impl SearchBlock {
    /// Position of this block in the plan.
    #[must_use]
    pub const fn window_ref(&self) -> WindowRef {
        WindowRef {
            group_index: self.group_index,
            interval_index: self.interval_index,
        }
    }
}

/// Ordered windows for one search, group-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaggerPlan {
    /// Resolution the windows are aligned to.
    pub granularity: Granularity,
    /// Periods per window.
    pub window_length: u32,
    /// Periods between the starts of adjacent groups.
    pub offset_units: i64,
    /// Number of groups (`stagger + 1`).
    pub group_count: usize,
    /// Every window, group 0 first.
    pub blocks: Vec<SearchBlock>,
}

impl StaggerPlan {
    /// Windows grouped by stagger group, each in interval order.
    #[must_use]
    pub fn groups(&self) -> Vec<Vec<SearchBlock>> {
        let mut out = vec![Vec::new(); self.group_count];
        for b in &self.blocks {
            out[b.group_index].push(*b);
        }
        out
    }

    /// Total number of windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the plan has no windows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Plan fetch windows covering `[start, end]` at `granularity`.
///
/// Each of the `stagger + 1` groups covers the range with back-to-back windows
/// of `window_length` periods. Group `s` starts `(stagger - s) * offset_units`
/// periods before `start`, where `offset_units = window_length / (stagger + 1)`.
/// The last group is the anchor and starts at `start` with
/// `ceil(units / window_length)` windows; earlier groups carry one extra window
/// so they still reach `end`. Every window spans exactly `window_length`
/// periods, so the tail of a group may run past `end`.
///
/// # Errors
/// Returns `StitchError::Planning` for a zero window length, for a stagger that
/// leaves groups coinciding, for `end < start`, or for unrepresentable dates.
pub fn plan(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Granularity,
    window_length: u32,
    stagger: usize,
) -> Result<StaggerPlan, StitchError> {
    if window_length == 0 {
        return Err(StitchError::planning("window length must be at least 1"));
    }
    if end < start {
        return Err(StitchError::planning(format!(
            "end {end} is before start {start}"
        )));
    }
    let groups = stagger
        .checked_add(1)
        .ok_or_else(|| StitchError::planning("stagger too large"))?;
    let offset_units = if stagger == 0 {
        0
    } else {
        i64::from(window_length) / i64::try_from(groups).unwrap_or(i64::MAX)
    };
    if stagger > 0 && offset_units == 0 {
        return Err(StitchError::planning(format!(
            "stagger {stagger} is too large for a window of {window_length} periods"
        )));
    }

    let cal = calendar(granularity);
    let first = cal.period_start(start)?;
    let last = cal.last_instant(end)?;
    let total_units = cal.units_between(first, last);
    let length = i64::from(window_length);
    let base_intervals = usize::try_from(
        total_units
            .max(1)
            .unsigned_abs()
            .div_ceil(u64::from(window_length)),
    )
    .map_err(|_| StitchError::planning("range needs too many windows"))?;

    let mut blocks = Vec::with_capacity(groups * (base_intervals + 1));
    for group_index in 0..groups {
        let lead = i64::try_from(stagger - group_index)
            .ok()
            .and_then(|n| n.checked_mul(offset_units))
            .ok_or_else(|| StitchError::planning("stagger too large"))?;
        let group_start = cal.shift(first, -lead)?;
        let windows = if group_index == stagger {
            base_intervals
        } else {
            base_intervals + 1
        };
        for interval_index in 0..windows {
            let offset = i64::try_from(interval_index)
                .ok()
                .and_then(|n| n.checked_mul(length))
                .ok_or_else(|| StitchError::planning("range needs too many windows"))?;
            let window_start = cal.shift(group_start, offset)?;
            blocks.push(SearchBlock {
                start: window_start,
                end: cal.window_end(window_start, window_length)?,
                group_index,
                interval_index,
            });
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        granularity = %granularity,
        window_length,
        stagger,
        offset_units,
        total_units,
        blocks = blocks.len(),
        "planned windows"
    );

    Ok(StaggerPlan {
        granularity,
        window_length,
        offset_units,
        group_count: groups,
        blocks,
    })
}
