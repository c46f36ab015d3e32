//! Configuration types shared by the engine and the orchestrator.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StitchError;
use crate::granularity::GranularityRules;

/// Per-timestamp reduction applied across stagger groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineStat {
    /// Keep every group as its own column.
    None,
    /// Arithmetic mean of present values.
    Mean,
    /// Median of present values.
    #[default]
    Median,
    /// Most common value; ties resolve to the mean of the tied modes.
    Mode,
}

impl FromStr for CombineStat {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "mode" => Ok(Self::Mode),
            other => Err(StitchError::planning(format!(
                "invalid combine statistic: {other:?} (expected none, mean, median or mode)"
            ))),
        }
    }
}

/// Objective used to align a window to its neighbour over their overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMethod {
    /// Least squares: minimise the sum of squared differences.
    Ssd,
    /// Minimise the median absolute deviation.
    #[default]
    Mad,
}

impl FromStr for ScaleMethod {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssd" => Ok(Self::Ssd),
            "mad" => Ok(Self::Mad),
            other => Err(StitchError::planning(format!(
                "invalid scaling method: {other:?} (expected ssd or mad)"
            ))),
        }
    }
}

/// Which window of the flattened plan keeps its original scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReferenceSelector {
    /// The first window.
    #[default]
    First,
    /// The last window.
    Last,
    /// The window with the smallest median value.
    LowestMedian,
    /// The window with the largest median value.
    HighestMedian,
    /// An explicit position in the flattened plan.
    Index(usize),
}

impl fmt::Display for ReferenceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Last => f.write_str("last"),
            Self::LowestMedian => f.write_str("lowest_median"),
            Self::HighestMedian => f.write_str("highest_median"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl FromStr for ReferenceSelector {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "lowest_median" => Ok(Self::LowestMedian),
            "highest_median" => Ok(Self::HighestMedian),
            _ => s.parse::<usize>().map(Self::Index).map_err(|_| {
                StitchError::planning(format!("invalid reference selector: {s:?}"))
            }),
        }
    }
}

impl TryFrom<String> for ReferenceSelector {
    type Error = StitchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReferenceSelector> for String {
    fn from(r: ReferenceSelector) -> Self {
        r.to_string()
    }
}

/// Which providers are tried for each window, and in what order.
///
/// Resolution order: `use_provider` forces a single provider; otherwise the
/// selected named `mode`; otherwise `order`; otherwise registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderPolicy {
    /// Default priority list of provider names.
    #[serde(default)]
    pub order: Vec<String>,
    /// Named priority lists.
    #[serde(default)]
    pub modes: BTreeMap<String, Vec<String>>,
    /// Selected entry of `modes`.
    #[serde(default)]
    pub mode: Option<String>,
    /// Single provider overriding every list.
    #[serde(default)]
    pub use_provider: Option<String>,
}

impl ProviderPolicy {
    /// Provider names to try, or `None` to use registration order.
    ///
    /// # Errors
    /// Returns `StitchError::Planning` when the selected mode is not defined.
    pub fn effective_order(&self) -> Result<Option<&[String]>, StitchError> {
        if let Some(single) = &self.use_provider {
            return Ok(Some(std::slice::from_ref(single)));
        }
        if let Some(mode) = &self.mode {
            return self
                .modes
                .get(mode)
                .map(|list| Some(list.as_slice()))
                .ok_or_else(|| StitchError::planning(format!("unknown provider mode: {mode:?}")));
        }
        if self.order.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.order.as_slice()))
        }
    }

    /// Every provider name referenced anywhere in the policy.
    pub fn referenced_names(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .chain(self.modes.values().flatten())
            .chain(self.use_provider.iter())
            .map(String::as_str)
    }
}

/// Global settings for an orchestrator instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StitchConfig {
    /// Granularity selection rules and per-window record caps.
    #[serde(default)]
    pub rules: GranularityRules,
    /// Provider priority and fallback policy.
    #[serde(default)]
    pub provider_policy: ProviderPolicy,
    /// Pause between successive provider calls.
    #[serde(default)]
    pub request_delay: Duration,
    /// Upper bound on a single provider call.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout: Duration,
    /// Synthesize zero-filled windows instead of calling providers.
    #[serde(default)]
    pub dry_run: bool,
}

const fn default_provider_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            rules: GranularityRules::default(),
            provider_policy: ProviderPolicy::default(),
            request_delay: Duration::ZERO,
            provider_timeout: default_provider_timeout(),
            dry_run: false,
        }
    }
}
