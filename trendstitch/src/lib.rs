//! trendstitch collects long-horizon interest-over-time series from providers
//! that only serve bounded windows per request.
//!
//! Overview
//! - Picks the sampling resolution from configurable granularity rules.
//! - Splits the range into the fewest provider-legal windows, optionally
//!   over-sampled with staggered overlapping groups.
//! - Fetches windows one at a time through registered `Fetcher`s, falling back
//!   in policy order, with a configurable pause between provider calls.
//! - Reconciles overlapping windows (SSD or MAD), combines the groups and
//!   normalizes the result to a maximum of 100.
//!
//! Key behaviors and trade-offs
//! - Direct path: a range that fits one window is fetched once and returned
//!   untouched; staggering is ignored with a warning.
//! - Stagger: more groups mean more provider calls but more overlap to
//!   estimate scale factors from.
//! - MAD reconciliation tolerates outliers in the overlap; SSD is the
//!   least-squares fit and reacts to every point.
//! - Failures: a window that fails on every provider aborts the search; no
//!   partial series is returned.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use trendstitch::{Granularity, SearchRequest, Stitcher};
//! use trendstitch_mock::TrendFetcher;
//!
//! let stitcher = Stitcher::builder()
//!     .with_fetcher(Arc::new(TrendFetcher::new()))
//!     .request_delay(std::time::Duration::from_secs(4))
//!     .build()?;
//!
//! let req = SearchRequest::builder("flu shot")
//!     .start(start)
//!     .duration(620)
//!     .granularity(Granularity::Day)
//!     .stagger(1)
//!     .build()?;
//! let report = stitcher.search(&req).await?;
//! for record in &report.log {
//!     println!("{record:?}");
//! }
//! ```
//!
//! See `trendstitch/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod search;

pub use crate::core::{Stitcher, StitcherBuilder, tag_err};
pub use search::phase::SearchPhase;
pub use search::request::{SearchRequest, SearchRequestBuilder};
pub use search::session::AttemptObserver;
pub use search::util::collapse_errors;

// Re-export core types for convenience
pub use trendstitch_core::{
    AttemptRecord, CombineOptions, CombineStat, CombinedSeries, Fetcher, FetcherKey, Granularity,
    GranularityRule, GranularityRules, GridRow, Point, ProviderPolicy, ReferenceSelector,
    ScaleMethod, SearchReport, SeriesGrid, StitchConfig, StitchError, StitchWarning, TimeSeries,
    WindowRef,
};
