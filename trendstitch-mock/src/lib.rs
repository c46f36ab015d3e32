//! Deterministic fetchers for trendstitch tests and examples.
//!
//! - [`SincFetcher`]: a sinc-shaped window, peaking at 100, like a provider
//!   that normalizes every response independently.
//! - [`TrendFetcher`]: samples one global signal and normalizes each window to
//!   a maximum of 100, optionally with seeded noise. Overlapping windows
//!   therefore disagree only by a scale factor.
//! - [`ConstantFetcher`]: fills every period with one value.
//! - [`ScriptedFetcher`]: replays scripted outcomes and records calls.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trendstitch_core::{Fetcher, StitchError, TimeSeries};

mod scripted;
mod signal;

pub use scripted::{MockBehavior, RecordedCall, ScriptController, ScriptedFetcher};
pub use signal::{Cadence, period_starts, sinc_data};

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Sinc-wave fetcher mirroring a dummy provider.
#[derive(Debug, Clone)]
pub struct SincFetcher {
    name: &'static str,
    cadence: Cadence,
    zero_crossings: u32,
    available: bool,
}

impl Default for SincFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SincFetcher {
    /// Daily-or-coarser sinc fetcher named `mock-sinc` with two zero crossings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "mock-sinc",
            cadence: Cadence::default(),
            zero_crossings: 2,
            available: true,
        }
    }

    /// Rename the fetcher.
    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Override how the returned resolution is chosen.
    #[must_use]
    pub fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Number of zero crossings on each side of the peak.
    #[must_use]
    pub const fn zero_crossings(mut self, n: u32) -> Self {
        self.zero_crossings = n;
        self
    }

    /// Report the fetcher as unavailable.
    #[must_use]
    pub const fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

#[async_trait]
impl Fetcher for SincFetcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn fetch(
        &self,
        _term: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeries, StitchError> {
        let g = self.cadence.granularity_for(start, end);
        let stamps = period_starts(g, start, end)?;
        let values = sinc_data(self.zero_crossings, 100.0, 0.0, stamps.len());
        TimeSeries::new(stamps.into_iter().zip(values.into_iter().map(round2)).collect())
    }
}

/// Fetcher returning one constant value for every period.
#[derive(Debug, Clone)]
pub struct ConstantFetcher {
    name: &'static str,
    value: f64,
    cadence: Cadence,
}

impl ConstantFetcher {
    /// Constant fetcher named `mock-constant`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            name: "mock-constant",
            value,
            cadence: Cadence::default(),
        }
    }

    /// Rename the fetcher.
    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Override how the returned resolution is chosen.
    #[must_use]
    pub fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }
}

#[async_trait]
impl Fetcher for ConstantFetcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    async fn fetch(
        &self,
        _term: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeries, StitchError> {
        let g = self.cadence.granularity_for(start, end);
        let stamps = period_starts(g, start, end)?;
        TimeSeries::new(stamps.into_iter().map(|ts| (ts, self.value)).collect())
    }
}

/// Underlying interest for the trend fetcher: a yearly cycle on a slow rise.
#[must_use]
pub fn trend_signal(ts: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let days = ts.timestamp() as f64 / 86_400.0;
    let yearly = (2.0 * std::f64::consts::PI * days / 365.25).sin();
    let drift = (days / 3_650.0).rem_euclid(1.0);
    60.0 + 30.0 * yearly + 20.0 * drift
}

/// Fetcher that samples [`trend_signal`] and normalizes each window to 100.
#[derive(Debug, Clone)]
pub struct TrendFetcher {
    name: &'static str,
    cadence: Cadence,
    noise: f64,
    seed: u64,
}

impl Default for TrendFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TrendFetcher {
    /// Noise-free trend fetcher named `mock-trend`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "mock-trend",
            cadence: Cadence::default(),
            noise: 0.0,
            seed: 0,
        }
    }

    /// Rename the fetcher.
    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Override how the returned resolution is chosen.
    #[must_use]
    pub fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Multiply each value by a factor drawn from `[1 - amplitude, 1 + amplitude]`.
    ///
    /// The generator is seeded from `seed` and the window start, so repeated
    /// calls for the same window return the same data.
    #[must_use]
    pub const fn noise(mut self, amplitude: f64, seed: u64) -> Self {
        self.noise = amplitude;
        self.seed = seed;
        self
    }
}

#[async_trait]
impl Fetcher for TrendFetcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    async fn fetch(
        &self,
        _term: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeries, StitchError> {
        let g = self.cadence.granularity_for(start, end);
        let stamps = period_starts(g, start, end)?;
        let mut rng = StdRng::seed_from_u64(self.seed ^ start.timestamp().unsigned_abs());
        let raw: Vec<f64> = stamps
            .iter()
            .map(|ts| {
                let jitter = if self.noise > 0.0 {
                    1.0 + rng.random_range(-self.noise..=self.noise)
                } else {
                    1.0
                };
                trend_signal(*ts) * jitter
            })
            .collect();
        let max = raw.iter().copied().fold(0.0, f64::max);
        let k = if max > 0.0 { 100.0 / max } else { 1.0 };
        TimeSeries::new(
            stamps
                .into_iter()
                .zip(raw.into_iter().map(|v| round2(v * k)))
                .collect(),
        )
    }
}
