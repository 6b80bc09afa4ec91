//! Summary statistics shared by the inversion driver and reports.
//!
//! The two fit-quality numbers reported for every inversion are:
//!
//! - `relrms`: root-mean-square of the relative data misfit, in percent
//! - `chi2`: mean squared error-weighted misfit of the log-transformed data
//!
//! `chi2 ~ 1` means the response explains the data to within the assumed
//! relative errors; `chi2 >> 1` means underfitting.

/// Median of a slice (ignores nothing; returns `None` on empty input).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Relative RMS misfit in percent: `100 * sqrt(mean(((d - f) / d)^2))`.
///
/// Returns `None` on empty or mismatched input, or when an observation is zero
/// or non-finite.
pub fn relrms_pct(observed: &[f64], predicted: &[f64]) -> Option<f64> {
    if observed.is_empty() || observed.len() != predicted.len() {
        return None;
    }
    let mut acc = 0.0;
    for (&d, &f) in observed.iter().zip(predicted.iter()) {
        if !(d.is_finite() && f.is_finite()) || d == 0.0 {
            return None;
        }
        let r = (d - f) / d;
        acc += r * r;
    }
    Some(100.0 * (acc / observed.len() as f64).sqrt())
}

/// Error-weighted chi-square of the log-transformed data, normalized by count:
/// `mean(((ln d - ln f) / err)^2)`.
///
/// `err` holds relative errors (e.g. `0.03` for 3%); in log space a relative
/// error is, to first order, an absolute error on `ln d`.
pub fn chi2_log(observed: &[f64], predicted: &[f64], err: &[f64]) -> Option<f64> {
    if observed.is_empty()
        || observed.len() != predicted.len()
        || observed.len() != err.len()
    {
        return None;
    }
    let mut acc = 0.0;
    for i in 0..observed.len() {
        let (d, f, e) = (observed[i], predicted[i], err[i]);
        if !(d.is_finite() && f.is_finite() && e.is_finite()) || d <= 0.0 || f <= 0.0 || e <= 0.0 {
            return None;
        }
        let r = (d.ln() - f.ln()) / e;
        acc += r * r;
    }
    Some(acc / observed.len() as f64)
}
