use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use trendstitch_types::{CombineStat, CombinedSeries, GridRow, SeriesGrid, TimeSeries};

use super::stats::{mean, median, mode_mean, round_to};

/// How reconciled groups are merged into the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombineOptions {
    /// Drop timestamps not covered by every group.
    pub trim: bool,
    /// Per-timestamp reduction across groups.
    pub stat: CombineStat,
    /// Rescale so the global maximum is 100.
    pub final_scale: bool,
    /// Decimal places to round to; `None` keeps full precision.
    pub round_digits: Option<u32>,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            trim: true,
            stat: CombineStat::Median,
            final_scale: true,
            round_digits: Some(2),
        }
    }
}

/// Column label for stagger group `group_index` (zero-based).
#[must_use]
pub fn column_label(term: &str, group_index: usize) -> String {
    format!("{}_{}", term.replace(' ', "_"), group_index + 1)
}

/// Concatenate a group's windows in interval order. On a repeated timestamp
/// the earlier window wins.
#[must_use]
pub fn concat_group(windows: &[TimeSeries]) -> TimeSeries {
    TimeSeries::from_unordered(windows.iter().flat_map(|w| w.points().iter().copied()))
}

/// Outer-join labelled series on timestamp; absent cells are `None`.
#[must_use]
pub fn outer_join(columns: Vec<(String, TimeSeries)>) -> SeriesGrid {
    let width = columns.len();
    let mut rows: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();
    for (col, (_, series)) in columns.iter().enumerate() {
        for &(ts, v) in series.points() {
            rows.entry(ts).or_insert_with(|| vec![None; width])[col] = Some(v);
        }
    }
    SeriesGrid {
        columns: columns.into_iter().map(|(label, _)| label).collect(),
        rows: rows
            .into_iter()
            .map(|(ts, values)| GridRow { ts, values })
            .collect(),
    }
}

fn reduce(stat: CombineStat, values: &[f64]) -> Option<f64> {
    match stat {
        CombineStat::Mean => mean(values),
        CombineStat::Median | CombineStat::None => median(values),
        CombineStat::Mode => mode_mean(values),
    }
}

fn normalization_factor<'a>(values: impl Iterator<Item = &'a f64>) -> Option<f64> {
    let max = values.copied().filter(|v| v.is_finite()).reduce(f64::max)?;
    (max > 0.0).then(|| 100.0 / max)
}

/// Merge reconciled stagger groups into one output.
///
/// Each non-empty group becomes one column `"{term}_{n}"`; columns are
/// outer-joined on timestamp, optionally trimmed to rows present in every
/// column, reduced per row with `stat` (or kept as a grid for
/// [`CombineStat::None`]), normalized so the maximum is 100 when positive,
/// and rounded.
#[must_use]
pub fn combine(term: &str, groups: &[Vec<TimeSeries>], opts: CombineOptions) -> CombinedSeries {
    let columns: Vec<(String, TimeSeries)> = groups
        .iter()
        .enumerate()
        .map(|(g, windows)| (column_label(term, g), concat_group(windows)))
        .filter(|(_, s)| !s.is_empty())
        .collect();
    let mut grid = outer_join(columns);
    if opts.trim {
        grid.rows.retain(|r| r.values.iter().all(Option::is_some));
    }

    if opts.stat == CombineStat::None {
        let factor = if opts.final_scale {
            normalization_factor(grid.rows.iter().flat_map(|r| r.values.iter().flatten()))
        } else {
            None
        };
        for row in &mut grid.rows {
            for v in row.values.iter_mut().flatten() {
                *v = finish(*v, factor, opts.round_digits);
            }
        }
        return CombinedSeries::Grid(grid);
    }

    let reduced: Vec<(DateTime<Utc>, f64)> = grid
        .rows
        .iter()
        .filter_map(|r| {
            let present: Vec<f64> = r.values.iter().flatten().copied().collect();
            reduce(opts.stat, &present).map(|v| (r.ts, v))
        })
        .collect();
    let factor = if opts.final_scale {
        normalization_factor(reduced.iter().map(|(_, v)| v))
    } else {
        None
    };
    CombinedSeries::Reduced(TimeSeries::from_unordered(
        reduced
            .into_iter()
            .map(|(ts, v)| (ts, finish(v, factor, opts.round_digits))),
    ))
}

fn finish(value: f64, factor: Option<f64>, round_digits: Option<u32>) -> f64 {
    let scaled = factor.map_or(value, |k| value * k);
    round_digits.map_or(scaled, |d| round_to(scaled, d))
}
