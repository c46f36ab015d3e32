use chrono::TimeDelta;
use trendstitch_types::{Granularity, TimeSeries};

const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// Estimate a representative step (in seconds) from positive adjacent timestamp
/// deltas in the series.
///
/// Prefer the mode (most frequent positive delta); if there is no unique mode,
/// return the lower median. Returns `None` for fewer than two observations.
#[must_use]
pub fn estimate_step_seconds(series: &TimeSeries) -> Option<i64> {
    let ts: Vec<_> = series.timestamps().collect();
    if ts.len() < 2 {
        return None;
    }
    let mut deltas: Vec<i64> = ts
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|dt| *dt > TimeDelta::zero())
        .map(|dt| dt.num_seconds())
        .collect();
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    let mut best_delta = deltas[0];
    let mut best_count = 0usize;
    let mut num_best_candidates = 0usize;
    let mut i = 0;
    while i < deltas.len() {
        let d = deltas[i];
        let run = deltas[i..].iter().take_while(|&&x| x == d).count();
        if run > best_count {
            best_count = run;
            best_delta = d;
            num_best_candidates = 1;
        } else if run == best_count {
            num_best_candidates += 1;
        }
        i += run;
    }
    if num_best_candidates == 1 {
        return Some(best_delta);
    }

    // Lower median
    let mid = deltas.len() / 2;
    if deltas.len() % 2 == 1 {
        Some(deltas[mid])
    } else {
        Some(deltas[mid - 1])
    }
}

/// Map a step in seconds to the closest granularity that can produce it.
///
/// Month, quarter and year lengths vary, so each bucket accepts the longest
/// period of its kind.
#[must_use]
pub const fn granularity_for_step(step_seconds: i64) -> Granularity {
    match step_seconds {
        s if s <= HOUR => Granularity::Hour,
        s if s <= DAY => Granularity::Day,
        s if s <= 7 * DAY => Granularity::Week,
        s if s <= 31 * DAY => Granularity::Month,
        s if s <= 92 * DAY => Granularity::Quarter,
        s if s <= 366 * DAY => Granularity::Year,
        _ => Granularity::Decade,
    }
}

/// Resolution the series appears to be sampled at.
#[must_use]
pub fn observed_granularity(series: &TimeSeries) -> Option<Granularity> {
    estimate_step_seconds(series).map(granularity_for_step)
}
