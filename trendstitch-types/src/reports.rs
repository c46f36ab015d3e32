//! Report envelopes and attempt-log records produced by a search.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StitchError;
use crate::granularity::Granularity;
use crate::series::CombinedSeries;

/// Position of a window in the stagger plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowRef {
    /// Stagger group.
    pub group_index: usize,
    /// Window position inside the group.
    pub interval_index: usize,
}

impl fmt::Display for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {} window {}", self.group_index, self.interval_index)
    }
}

/// Non-fatal conditions met while planning, reconciling or validating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StitchWarning {
    /// Two neighbouring windows share no timestamp; the target kept its scale.
    NoOverlap {
        /// Already-scaled neighbour.
        reference: WindowRef,
        /// Window left unscaled.
        target: WindowRef,
    },
    /// The overlap could not determine a finite non-zero factor; identity used.
    DegenerateOverlap {
        /// Already-scaled neighbour.
        reference: WindowRef,
        /// Window left unscaled.
        target: WindowRef,
    },
    /// Returned data is sampled at a different resolution than requested.
    GranularityMismatch {
        /// Resolution that was requested or auto-selected.
        requested: Granularity,
        /// Resolution inferred from the returned timestamps.
        observed: Granularity,
    },
    /// A single window covers the range, so staggering was not applied.
    StaggerIgnored {
        /// Requested stagger.
        stagger: usize,
    },
}

impl fmt::Display for StitchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOverlap { reference, target } => {
                write!(f, "no overlap between {reference} and {target}; left unscaled")
            }
            Self::DegenerateOverlap { reference, target } => write!(
                f,
                "degenerate overlap between {reference} and {target}; identity scaling"
            ),
            Self::GranularityMismatch {
                requested,
                observed,
            } => write!(f, "requested granularity {requested} but data is {observed}"),
            Self::StaggerIgnored { stagger } => {
                write!(f, "stagger {stagger} ignored for a single-window range")
            }
        }
    }
}

/// One entry of the append-only attempt log.
///
/// A record is written for every provider call (success or failure), every
/// skipped provider, and every warning raised during the search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Search term.
    pub term: String,
    /// Planned window start.
    pub planned_start: DateTime<Utc>,
    /// Planned window end.
    pub planned_end: DateTime<Utc>,
    /// Position in the flattened plan; `None` for the direct path and for
    /// search-level warnings.
    pub block_index: Option<usize>,
    /// Provider that served (or failed) this attempt.
    pub provider_used: Option<String>,
    /// Resolution inferred from the returned data.
    pub observed_granularity: Option<Granularity>,
    /// Failure, if the attempt failed.
    pub error: Option<StitchError>,
    /// Warning attached to this record.
    pub warning: Option<StitchWarning>,
}

impl AttemptRecord {
    /// Blank record for a planned window.
    #[must_use]
    pub fn planned(
        term: impl Into<String>,
        planned_start: DateTime<Utc>,
        planned_end: DateTime<Utc>,
        block_index: Option<usize>,
    ) -> Self {
        Self {
            term: term.into(),
            planned_start,
            planned_end,
            block_index,
            provider_used: None,
            observed_granularity: None,
            error: None,
            warning: None,
        }
    }

    /// True when the attempt produced neither an error nor a warning.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.error.is_none() && self.warning.is_none()
    }
}

/// Summary of one stitched search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Search term.
    pub term: String,
    /// Resolution the search was planned at.
    pub granularity: Granularity,
    /// Number of windows one group needs to cover the range.
    pub blocks_needed: usize,
    /// Combined output.
    pub series: CombinedSeries,
    /// Attempt log in the order events happened.
    pub log: Vec<AttemptRecord>,
    /// Non-fatal issues encountered while building the report.
    pub warnings: Vec<StitchWarning>,
}
