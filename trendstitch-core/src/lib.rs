//! trendstitch-core
//!
//! The segmentation-and-reconciliation engine behind trendstitch.
//!
//! - `granularity`: calendar table and granularity resolution.
//! - `plan`: provider-legal fetch windows and stagger groups.
//! - `fetcher`: the `Fetcher` trait implemented by data sources.
//! - `timeseries`: cadence inference, reconciliation and combining.
//!
//! Everything here is synchronous except the `Fetcher` trait, which is
//! awaited by the orchestrator in the `trendstitch` crate.
#![warn(missing_docs)]

/// The `Fetcher` trait implemented by data sources.
pub mod fetcher;
/// Calendar arithmetic and granularity selection.
pub mod granularity;
/// Fetch window planning.
pub mod plan;
/// Series utilities for inference, reconciliation and combining.
pub mod timeseries;

pub use fetcher::{Fetcher, FetcherKey};
pub use granularity::{Calendar, Resolution, calendar, resolve};
pub use plan::{SearchBlock, StaggerPlan, plan};
pub use timeseries::combine::{CombineOptions, column_label, combine, concat_group, outer_join};
pub use timeseries::infer::{estimate_step_seconds, granularity_for_step, observed_granularity};
pub use timeseries::reconcile::{
    Reconciled, Scaled, mad_factor, scale_series, scale_stagger_groups, ssd_factor,
};
pub use trendstitch_types::*;
