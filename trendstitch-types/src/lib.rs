//! Trendstitch data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod fetcher;
mod granularity;
mod reports;
mod series;

pub use config::{CombineStat, ProviderPolicy, ReferenceSelector, ScaleMethod, StitchConfig};
pub use error::StitchError;
pub use fetcher::FetcherKey;
pub use granularity::{Granularity, GranularityRule, GranularityRules};
pub use reports::{AttemptRecord, SearchReport, StitchWarning, WindowRef};
pub use series::{CombinedSeries, GridRow, Point, SeriesGrid, TimeSeries};
