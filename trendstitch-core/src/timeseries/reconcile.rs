use trendstitch_types::{ReferenceSelector, ScaleMethod, StitchError, StitchWarning, TimeSeries, WindowRef};

use super::stats::median;

/// A target window rescaled against a reference window.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaled {
    /// Rescaled target.
    pub series: TimeSeries,
    /// Factor applied to every target value.
    pub factor: f64,
    /// Number of shared timestamps.
    pub overlap: usize,
    /// True when the overlap could not determine a usable factor.
    pub degenerate: bool,
}

impl Scaled {
    fn identity(target: &TimeSeries, overlap: usize, degenerate: bool) -> Self {
        Self {
            series: target.clone(),
            factor: 1.0,
            overlap,
            degenerate,
        }
    }
}

/// `(reference, target)` value pairs at shared timestamps.
fn overlap_pairs(reference: &TimeSeries, target: &TimeSeries) -> Vec<(f64, f64)> {
    let (a, b) = (reference.points(), target.points());
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::new();
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push((a[i].1, b[j].1));
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Least-squares factor `Σxy / Σyy`; `None` when every target value is zero.
#[must_use]
pub fn ssd_factor(pairs: &[(f64, f64)]) -> Option<f64> {
    let syy: f64 = pairs.iter().map(|(_, y)| y * y).sum();
    if syy == 0.0 {
        return None;
    }
    let sxy: f64 = pairs.iter().map(|(x, y)| x * y).sum();
    Some(sxy / syy)
}

fn mad_objective(pairs: &[(f64, f64)], k: f64) -> f64 {
    let residuals: Vec<f64> = pairs.iter().map(|(x, y)| (x - k * y).abs()).collect();
    median(&residuals).unwrap_or(f64::INFINITY)
}

/// Factor `k ≥ 0` minimising `median(|x - k·y|)`.
///
/// The objective is piecewise linear in `k`, so its minimum over `k ≥ 0` lies
/// on `0` or on a breakpoint: a root `x_i / y_i` of one residual, or a
/// crossing of two residuals `(x_i ∓ x_j) / (y_i ∓ y_j)`. Every candidate is
/// evaluated; ties resolve to the candidate closest to `1.0`. A result of `0`
/// means the overlap cannot fix a usable scale. Returns `None` when either
/// side of the overlap is entirely zero.
#[must_use]
pub fn mad_factor(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.iter().all(|(_, y)| *y == 0.0) || pairs.iter().all(|(x, _)| *x == 0.0) {
        return None;
    }
    let mut candidates = vec![0.0, 1.0];
    for (i, &(xi, yi)) in pairs.iter().enumerate() {
        if yi != 0.0 {
            candidates.push(xi / yi);
        }
        for &(xj, yj) in &pairs[i + 1..] {
            if yi != yj {
                candidates.push((xi - xj) / (yi - yj));
            }
            if yi + yj != 0.0 {
                candidates.push((xi + xj) / (yi + yj));
            }
        }
    }
    candidates.retain(|k| k.is_finite() && *k >= 0.0);
    candidates.sort_unstable_by(f64::total_cmp);
    candidates.dedup();

    let mut best: Option<(f64, f64)> = None;
    for k in candidates {
        let f = mad_objective(pairs, k);
        best = match best {
            None => Some((k, f)),
            Some((bk, bf)) => {
                let tol = 1e-12 * bf.abs().max(1.0);
                if f < bf - tol || ((f - bf).abs() <= tol && (k - 1.0).abs() < (bk - 1.0).abs()) {
                    Some((k, f))
                } else {
                    Some((bk, bf))
                }
            }
        };
    }
    best.map(|(k, _)| k)
}

/// Rescale `target` to agree with `reference` over their shared timestamps.
///
/// Without shared timestamps the target is returned unchanged with
/// `overlap == 0`. A zero, negative or non-finite factor is treated as
/// degenerate and the target is returned unchanged with `degenerate` set.
#[must_use]
pub fn scale_series(reference: &TimeSeries, target: &TimeSeries, method: ScaleMethod) -> Scaled {
    let pairs = overlap_pairs(reference, target);
    if pairs.is_empty() {
        return Scaled::identity(target, 0, false);
    }
    let factor = match method {
        ScaleMethod::Ssd => ssd_factor(&pairs),
        ScaleMethod::Mad => mad_factor(&pairs),
    };
    match factor {
        Some(k) if k.is_finite() && k > 0.0 => {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                ?method,
                factor = k,
                overlap = pairs.len(),
                "scaled window"
            );
            Scaled {
                series: target.scaled(k),
                factor: k,
                overlap: pairs.len(),
                degenerate: false,
            }
        }
        _ => Scaled::identity(target, pairs.len(), true),
    }
}

/// Stagger groups after reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// Rescaled windows, same shape as the input.
    pub groups: Vec<Vec<TimeSeries>>,
    /// Factor applied to each window, same shape as `groups`.
    pub factors: Vec<Vec<f64>>,
    /// Window that kept its original scale.
    pub reference: Option<WindowRef>,
    /// Overlaps that could not be used.
    pub warnings: Vec<StitchWarning>,
}

fn pick_reference(
    flat: &[(WindowRef, &TimeSeries)],
    selector: ReferenceSelector,
) -> Result<usize, StitchError> {
    let by_median = |prefer_low: bool| {
        let mut best: Option<(usize, f64)> = None;
        for (i, (_, s)) in flat.iter().enumerate() {
            let values: Vec<f64> = s.values().collect();
            let Some(m) = median(&values) else { continue };
            let better = match best {
                None => true,
                Some((_, bm)) if prefer_low => m < bm,
                Some((_, bm)) => m > bm,
            };
            if better {
                best = Some((i, m));
            }
        }
        best.map_or(0, |(i, _)| i)
    };
    match selector {
        ReferenceSelector::First => Ok(0),
        ReferenceSelector::Last => Ok(flat.len() - 1),
        ReferenceSelector::LowestMedian => Ok(by_median(true)),
        ReferenceSelector::HighestMedian => Ok(by_median(false)),
        ReferenceSelector::Index(i) if i < flat.len() => Ok(i),
        ReferenceSelector::Index(i) => Err(StitchError::planning(format!(
            "reference index {i} is out of range for {} windows",
            flat.len()
        ))),
    }
}

/// Reconcile every window of a stagger plan onto one common scale.
///
/// Windows are flattened interval-major (interval 0 of every group, then
/// interval 1, ...), so neighbours in the flattened order overlap. The
/// reference window keeps its scale; windows after it are scaled forward
/// against their already-scaled predecessor, then windows before it backward
/// against their already-scaled successor.
///
/// # Errors
/// Returns `StitchError::Planning` when an explicit reference index is out of range.
pub fn scale_stagger_groups(
    groups: &[Vec<TimeSeries>],
    method: ScaleMethod,
    reference: ReferenceSelector,
) -> Result<Reconciled, StitchError> {
    let longest = groups.iter().map(Vec::len).max().unwrap_or(0);
    let mut flat: Vec<(WindowRef, &TimeSeries)> = Vec::new();
    for interval_index in 0..longest {
        for (group_index, group) in groups.iter().enumerate() {
            if let Some(s) = group.get(interval_index) {
                flat.push((
                    WindowRef {
                        group_index,
                        interval_index,
                    },
                    s,
                ));
            }
        }
    }
    if flat.is_empty() {
        if let ReferenceSelector::Index(i) = reference {
            return Err(StitchError::planning(format!(
                "reference index {i} is out of range for 0 windows"
            )));
        }
        return Ok(Reconciled {
            groups: groups.to_vec(),
            factors: groups.iter().map(|g| vec![1.0; g.len()]).collect(),
            reference: None,
            warnings: Vec::new(),
        });
    }

    let ref_idx = pick_reference(&flat, reference)?;
    let mut scaled: Vec<TimeSeries> = flat.iter().map(|(_, s)| (*s).clone()).collect();
    let mut factors = vec![1.0; flat.len()];
    let mut warnings = Vec::new();

    let mut step = |target: usize, neighbour: usize, scaled: &mut Vec<TimeSeries>| {
        let out = scale_series(&scaled[neighbour], flat[target].1, method);
        let (reference, target_ref) = (flat[neighbour].0, flat[target].0);
        if out.overlap == 0 {
            warnings.push(StitchWarning::NoOverlap {
                reference,
                target: target_ref,
            });
        } else if out.degenerate {
            warnings.push(StitchWarning::DegenerateOverlap {
                reference,
                target: target_ref,
            });
        }
        factors[target] = out.factor;
        scaled[target] = out.series;
    };
    for i in ref_idx + 1..flat.len() {
        step(i, i - 1, &mut scaled);
    }
    for i in (0..ref_idx).rev() {
        step(i, i + 1, &mut scaled);
    }

    let mut out_groups: Vec<Vec<TimeSeries>> = groups.iter().map(|g| Vec::with_capacity(g.len())).collect();
    let mut out_factors: Vec<Vec<f64>> = groups.iter().map(|g| Vec::with_capacity(g.len())).collect();
    // flattened order is interval-major, so pushing in order keeps intervals sorted per group
    for ((w, _), (series, factor)) in flat.iter().zip(scaled.into_iter().zip(factors)) {
        out_groups[w.group_index].push(series);
        out_factors[w.group_index].push(factor);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        windows = flat.len(),
        reference = %flat[ref_idx].0,
        warnings = warnings.len(),
        "reconciled stagger groups"
    );

    Ok(Reconciled {
        groups: out_groups,
        factors: out_factors,
        reference: Some(flat[ref_idx].0),
        warnings,
    })
}
