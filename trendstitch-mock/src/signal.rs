use chrono::{DateTime, Utc};
use trendstitch_core::{Granularity, GranularityRules, StitchError, calendar};

// Global minimum of sin(pi x)/(pi x), used to pin the trough to `min_value`.
const SINC_MIN: f64 = -0.217_233;

/// Sinc-shaped signal of `num_points` samples over `[-1, 1]` with
/// `zero_crossings` crossings on the positive axis, peaking at `max_value`
/// in the centre.
#[must_use]
pub fn sinc_data(zero_crossings: u32, max_value: f64, min_value: f64, num_points: usize) -> Vec<f64> {
    let raw: Vec<f64> = (0..num_points)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let x = if num_points > 1 {
                -1.0 + 2.0 * i as f64 / (num_points - 1) as f64
            } else {
                -1.0
            };
            let px = std::f64::consts::PI * x * f64::from(zero_crossings);
            if px == 0.0 { 1.0 } else { px.sin() / px }
        })
        .collect();
    let peak = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = peak - SINC_MIN;
    raw.into_iter()
        .map(|y| {
            let unit = if span > 0.0 { (y - SINC_MIN) / span } else { 0.0 };
            unit * (max_value - min_value) + min_value
        })
        .collect()
}

/// How a mock decides the resolution of the data it returns.
#[derive(Debug, Clone)]
pub enum Cadence {
    /// Always return this resolution.
    Fixed(Granularity),
    /// Pick the resolution from the span, like a real provider would.
    Auto(GranularityRules),
}

impl Default for Cadence {
    fn default() -> Self {
        Self::Auto(GranularityRules::default())
    }
}

impl Cadence {
    /// Resolution used for the window `[start, end]`.
    #[must_use]
    pub fn granularity_for(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Granularity {
        match self {
            Self::Fixed(g) => *g,
            Self::Auto(rules) => {
                let days = (end.date_naive() - start.date_naive()).num_days();
                rules.select(days).code
            }
        }
    }
}

/// Period starts at `granularity` covering `[start, end]`.
///
/// # Errors
/// Returns `StitchError::Data` when `end < start` or a date is out of range.
pub fn period_starts(
    granularity: Granularity,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, StitchError> {
    if end < start {
        return Err(StitchError::data(format!("end {end} is before start {start}")));
    }
    let cal = calendar(granularity);
    let mut cur = cal.period_start(start)?;
    let last = cal.period_start(end)?;
    let mut out = Vec::new();
    while cur <= last {
        out.push(cur);
        cur = cal.shift(cur, 1)?;
    }
    Ok(out)
}
