//! Log-domain helpers shared by both inference engines.

use ndarray::ArrayViewMut1;

/// Stable `ln(exp(x_1) + ... + exp(x_n))` via a max shift.
///
/// Returns `-inf` for an empty input or when every entry is `-inf`
/// (no state has support), and NaN when any entry is NaN.
///
/// # Example
///
/// ```
/// use pmrf::core::numeric::log_of_sum;
///
/// let s = log_of_sum([f64::ln(0.25), f64::ln(0.5), f64::ln(0.25)]);
/// assert!(s.abs() < 1e-12);
/// assert_eq!(log_of_sum([f64::NEG_INFINITY; 3]), f64::NEG_INFINITY);
/// ```
pub fn log_of_sum<I>(log_values: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let log_values = log_values.into_iter();
    let mut max = f64::NEG_INFINITY;
    for x in log_values.clone() {
        if x.is_nan() {
            return f64::NAN;
        }
        max = max.max(x);
    }
    if max.is_infinite() {
        return max;
    }
    let sum_exp: f64 = log_values.map(|x| f64::exp(x - max)).sum();
    max + sum_exp.ln()
}

/// Subtracts the log-sum of `log_values` from every entry so that
/// exponentiated entries sum to one. Returns the subtracted log-sum;
/// entries are left untouched when it is not finite.
pub fn normalize_log_in_place(mut log_values: ArrayViewMut1<f64>) -> f64 {
    let log_sum = log_of_sum(log_values.iter().copied());
    if log_sum.is_finite() {
        log_values -= log_sum;
    }
    log_sum
}

/// Position of the largest value using a strict greater-than comparison,
/// so the first of several equal maxima wins. NaN entries never win.
pub fn argmax_first(values: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}
