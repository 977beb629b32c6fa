//! NaN-aware reductions
//!
//! Every reducer ignores missing values. When a segment holds no defined
//! value at all the result is missing, except for the counts, which are 0.

use std::cmp::Ordering;

fn defined(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| !v.is_nan())
}

fn defined_vec(values: &[f64]) -> Vec<f64> {
    defined(values).collect()
}

pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = defined(values).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

pub fn sum(values: &[f64]) -> f64 {
    let mut iter = defined(values).peekable();
    if iter.peek().is_none() {
        return f64::NAN;
    }
    iter.sum()
}

pub fn product(values: &[f64]) -> f64 {
    let mut iter = defined(values).peekable();
    if iter.peek().is_none() {
        return f64::NAN;
    }
    iter.product()
}

pub fn min(values: &[f64]) -> f64 {
    defined(values).fold(f64::NAN, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    defined(values).fold(f64::NAN, f64::max)
}

pub fn span(values: &[f64]) -> f64 {
    max(values) - min(values)
}

pub fn median(values: &[f64]) -> f64 {
    let mut sorted = defined_vec(values);
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent value; ties go to the smallest value
pub fn mode(values: &[f64]) -> f64 {
    let mut sorted = defined_vec(values);
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut best = sorted[0];
    let mut best_count = 0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best_count {
            best = sorted[i];
            best_count = j - i;
        }
        i = j;
    }
    best
}

/// Population variance
pub fn var(values: &[f64]) -> f64 {
    let m = mean(values);
    if m.is_nan() {
        return f64::NAN;
    }
    let (ss, n) = defined(values).fold((0.0, 0usize), |(s, n), v| (s + (v - m).powi(2), n + 1));
    ss / n as f64
}

/// Population standard deviation
pub fn std(values: &[f64]) -> f64 {
    var(values).sqrt()
}

/// Weighted mean with weights 1..n; the last value weighs most
pub fn linear_ma(values: &[f64]) -> f64 {
    weighted_mean(values, |i, _| (i + 1) as f64)
}

/// Weighted mean with exponentially decaying weights, alpha = 2 / (n + 1)
pub fn exponential_ma(values: &[f64]) -> f64 {
    let alpha = 2.0 / (values.len() as f64 + 1.0);
    weighted_mean(values, |i, n| (1.0 - alpha).powi((n - 1 - i) as i32))
}

fn weighted_mean(values: &[f64], weight: impl Fn(usize, usize) -> f64) -> f64 {
    let n = values.len();
    let (total, weights) = values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold((0.0, 0.0), |(t, w), (i, v)| {
            let wi = weight(i, n);
            (t + wi * v, w + wi)
        });
    if weights == 0.0 {
        f64::NAN
    } else {
        total / weights
    }
}

/// Harmonic mean; zero when any value is zero, missing for negative values
pub fn harmonic_mean(values: &[f64]) -> f64 {
    let values = defined_vec(values);
    if values.is_empty() || values.iter().any(|&v| v < 0.0) {
        return f64::NAN;
    }
    if values.iter().any(|&v| v == 0.0) {
        return 0.0;
    }
    values.len() as f64 / values.iter().map(|v| 1.0 / v).sum::<f64>()
}

/// Geometric mean; zero when any value is zero, missing for negative values
pub fn geometric_mean(values: &[f64]) -> f64 {
    let values = defined_vec(values);
    if values.is_empty() || values.iter().any(|&v| v < 0.0) {
        return f64::NAN;
    }
    if values.iter().any(|&v| v == 0.0) {
        return 0.0;
    }
    (values.iter().map(|v| v.ln()).sum::<f64>() / values.len() as f64).exp()
}

/// Number of finite, non-zero values
pub fn count_nonzero(values: &[f64]) -> f64 {
    values.iter().filter(|v| v.is_finite() && **v != 0.0).count() as f64
}

/// Number of finite values
pub fn count_defined(values: &[f64]) -> f64 {
    values.iter().filter(|v| v.is_finite()).count() as f64
}

/// Running total; rows before the first defined value are missing
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    running(values, 0.0, |acc, v| acc + v)
}

/// Running product; rows before the first defined value are missing
pub fn cumulative_product(values: &[f64]) -> Vec<f64> {
    running(values, 1.0, |acc, v| acc * v)
}

fn running(values: &[f64], init: f64, op: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    let mut acc = init;
    let mut started = false;
    values
        .iter()
        .map(|&v| {
            if !v.is_nan() {
                acc = op(acc, v);
                started = true;
            }
            if started {
                acc
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Apply `reduce` to every window of `width` values, advancing by `step`.
///
/// Produces `(n - width) / step + 1` values, or none when the column is
/// shorter than the window.
pub fn windowed(values: &[f64], width: usize, step: usize, reduce: fn(&[f64]) -> f64) -> Vec<f64> {
    if width == 0 || step == 0 || values.len() < width {
        return Vec::new();
    }
    (0..=values.len() - width)
        .step_by(step)
        .map(|start| reduce(&values[start..start + width]))
        .collect()
}
