use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the trendstitch workspace.
///
/// Planning errors are raised before any provider is called. Provider-level
/// failures are tagged with the provider name and collapsed into the `reason`
/// of a [`StitchError::Fetch`] once every provider has failed for a block.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StitchError {
    /// Invalid request or configuration (granularity, range, window, options, rules).
    #[error("planning error: {0}")]
    Planning(String),

    /// A fetch window failed on every eligible provider.
    #[error("block {block_index} ({start} to {end}) failed: {reason}")]
    Fetch {
        /// Position of the failed window in the flattened plan.
        block_index: usize,
        /// Planned window start.
        start: DateTime<Utc>,
        /// Planned window end.
        end: DateTime<Utc>,
        /// Collapsed provider failures.
        reason: Box<StitchError>,
    },

    /// An individual provider returned an error.
    #[error("{provider} failed: {msg}")]
    Provider {
        /// Provider name that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// An individual provider call exceeded the configured timeout.
    #[error("provider timed out: {provider}")]
    ProviderTimeout {
        /// Provider name that timed out.
        provider: String,
    },

    /// All attempted providers failed; contains the individual failures.
    #[error("all providers failed: {0:?}")]
    AllProvidersFailed(Vec<StitchError>),

    /// No provider was eligible to serve the request.
    #[error("no providers available: {0}")]
    NoProviders(String),

    /// Issues with returned or expected data (ordering, record counts, cadence).
    #[error("data issue: {0}")]
    Data(String),
}

impl StitchError {
    /// Helper: build a `Planning` error.
    pub fn planning(msg: impl Into<String>) -> Self {
        Self::Planning(msg.into())
    }

    /// Helper: build a `Provider` error with the provider name and message.
    pub fn provider(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(provider: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
        }
    }

    /// Helper: build a `Data` error.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Helper: build a `Fetch` error for a window that failed on every provider.
    #[must_use]
    pub fn fetch(
        block_index: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reason: Self,
    ) -> Self {
        Self::Fetch {
            block_index,
            start,
            end,
            reason: Box::new(reason),
        }
    }

    /// Returns true when the error was raised while validating a request.
    #[must_use]
    pub const fn is_planning(&self) -> bool {
        matches!(self, Self::Planning(_))
    }

    /// Flatten nested `AllProvidersFailed` structures into a plain vector.
    ///
    /// Other variants are preserved as-is.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllProvidersFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
