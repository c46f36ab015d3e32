/// Arithmetic mean; `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    Some(values.iter().sum::<f64>() / n)
}

/// Median; the mean of the two middle values for even lengths.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut v = values.to_vec();
    v.sort_unstable_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some((v[mid - 1] + v[mid]) / 2.0)
    }
}

/// Most frequent value. When several values tie, their mean is returned.
#[must_use]
pub fn mode_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut v = values.to_vec();
    v.sort_unstable_by(f64::total_cmp);

    let mut modes: Vec<f64> = Vec::new();
    let mut best = 0usize;
    let mut i = 0;
    while i < v.len() {
        let x = v[i];
        let run = v[i..].iter().take_while(|y| y.total_cmp(&x).is_eq()).count();
        if run > best {
            best = run;
            modes.clear();
            modes.push(x);
        } else if run == best {
            modes.push(x);
        }
        i += run;
    }
    mean(&modes)
}

/// Round half to even at `digits` decimal places.
#[must_use]
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(digits).unwrap_or(i32::MAX));
    if !factor.is_finite() {
        return value;
    }
    (value * factor).round_ties_even() / factor
}
