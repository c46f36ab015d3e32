//! Single-term time series and the multi-column grid produced by combining.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StitchError;

/// One `(timestamp, value)` observation.
pub type Point = (DateTime<Utc>, f64);

/// Interest-over-time series for one term.
///
/// Timestamps are strictly increasing and unique. Values are relative
/// interest; they are only comparable within the same window until the
/// windows are reconciled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct TimeSeries {
    points: Vec<Point>,
}

impl TimeSeries {
    /// Build a series from points already sorted by timestamp.
    ///
    /// # Errors
    /// Returns `StitchError::Data` if timestamps are not strictly increasing.
    pub fn new(points: Vec<Point>) -> Result<Self, StitchError> {
        if let Some(w) = points.windows(2).find(|w| w[0].0 >= w[1].0) {
            return Err(StitchError::data(format!(
                "series timestamps must strictly increase: {} then {}",
                w[0].0, w[1].0
            )));
        }
        Ok(Self { points })
    }

    /// Build a series from points in any order. The first occurrence of a
    /// duplicated timestamp wins.
    #[must_use]
    pub fn from_unordered(points: impl IntoIterator<Item = Point>) -> Self {
        let mut points: Vec<Point> = points.into_iter().collect();
        // stable sort keeps first-seen order among equal timestamps
        points.sort_by_key(|p| p.0);
        points.dedup_by_key(|p| p.0);
        Self { points }
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observations in timestamp order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Timestamps in order.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.points.iter().map(|p| p.0)
    }

    /// Values in timestamp order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.1)
    }

    /// Value at exactly `ts`, if present.
    #[must_use]
    pub fn get(&self, ts: DateTime<Utc>) -> Option<f64> {
        self.points
            .binary_search_by_key(&ts, |p| p.0)
            .ok()
            .map(|i| self.points[i].1)
    }

    /// First and last timestamps.
    #[must_use]
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.points.first()?.0, self.points.last()?.0))
    }

    /// Observations at or before `end`.
    #[must_use]
    pub fn until(&self, end: DateTime<Utc>) -> Self {
        let keep = self.points.partition_point(|p| p.0 <= end);
        Self {
            points: self.points[..keep].to_vec(),
        }
    }

    /// New series with every value multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        self.map_values(|v| v * factor)
    }

    /// New series with `f` applied to every value.
    #[must_use]
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            points: self.points.iter().map(|&(ts, v)| (ts, f(v))).collect(),
        }
    }

    /// Consume the series, returning its points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl TryFrom<Vec<Point>> for TimeSeries {
    type Error = StitchError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<TimeSeries> for Vec<Point> {
    fn from(series: TimeSeries) -> Self {
        series.points
    }
}

/// One timestamp of a [`SeriesGrid`]; `None` marks a gap in that column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    /// Row timestamp.
    pub ts: DateTime<Utc>,
    /// One cell per grid column.
    pub values: Vec<Option<f64>>,
}

/// Outer join of several labelled series on timestamp.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesGrid {
    /// Column labels, `"{term}_{n}"` for the n-th stagger group.
    pub columns: Vec<String>,
    /// Rows in timestamp order.
    pub rows: Vec<GridRow>,
}

impl SeriesGrid {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the grid has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of the named column, in row order.
    pub fn column(&self, label: &str) -> Option<impl Iterator<Item = Option<f64>> + '_> {
        let idx = self.columns.iter().position(|c| c == label)?;
        Some(self.rows.iter().map(move |r| r.values[idx]))
    }
}

/// Final output of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CombinedSeries {
    /// Per-timestamp reduction of all stagger groups.
    Reduced(TimeSeries),
    /// Unreduced per-group columns.
    Grid(SeriesGrid),
}

impl CombinedSeries {
    /// Reduced series, if the combine statistic produced one.
    #[must_use]
    pub const fn as_series(&self) -> Option<&TimeSeries> {
        match self {
            Self::Reduced(s) => Some(s),
            Self::Grid(_) => None,
        }
    }

    /// Grid, if the combine statistic was `none`.
    #[must_use]
    pub const fn as_grid(&self) -> Option<&SeriesGrid> {
        match self {
            Self::Grid(g) => Some(g),
            Self::Reduced(_) => None,
        }
    }

    /// Number of rows in either representation.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Reduced(s) => s.len(),
            Self::Grid(g) => g.len(),
        }
    }

    /// True when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
