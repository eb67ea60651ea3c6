//! Windowed statistics and recurrences shared by the indicator algorithms.
//!
//! Every primitive returns a vector aligned with its input. Samples where the
//! primitive is undefined (warm-up, or a window touching an undefined input)
//! hold `f64::NAN`.

/// `2 / (period + 1)`, the EMA weight of the newest sample.
pub fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Simple moving average over a trailing window of `period` samples.
///
/// Uses a running sum, so each step costs O(1). Windows that contain a
/// non-finite sample are NaN; the running sum only tracks finite samples so a
/// single gap does not poison later windows.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let divisor = period as f64;
    let mut sum = 0.0;
    let mut undefined = 0usize;

    for (i, &value) in values.iter().enumerate() {
        if value.is_finite() {
            sum += value;
        } else {
            undefined += 1;
        }

        if i >= period {
            let leaving = values[i - period];
            if leaving.is_finite() {
                sum -= leaving;
            } else {
                undefined -= 1;
            }
        }

        if i + 1 >= period && undefined == 0 {
            out[i] = sum / divisor;
        }
    }

    out
}

/// Replace the first `period - 1` samples of `averaged` with the mean of the
/// `values` seen so far.
pub fn fill_running_mean(averaged: &mut [f64], values: &[f64], period: usize) {
    let mut sum = 0.0;
    for (i, value) in values.iter().take(period.saturating_sub(1)).enumerate() {
        sum += value;
        averaged[i] = sum / (i + 1) as f64;
    }
}

/// Exponential moving average seeded with the simple average of the first
/// `period` values, first defined at `period - 1`.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    ema_from(values, period, 0)
}

/// Exponential moving average of `values[start..]`.
///
/// The seed is the simple average of the first `period` consecutive defined
/// values at or after `start` (normally `values[start..start + period]`),
/// placed on the last of them; after that
/// `ema[i] = alpha * values[i] + (1 - alpha) * ema[i - 1]`.
///
/// An undefined input yields an undefined sample and the previous average is
/// carried over it unchanged.
pub fn ema_from(values: &[f64], period: usize, start: usize) -> Vec<f64> {
    let alpha = smoothing_factor(period);
    smooth_from(values, period, start, |avg, value| alpha * value + (1.0 - alpha) * avg)
}

/// Exponential moving average seeded with the first defined sample itself,
/// defined from index 0 when the series starts with a value.
///
/// Undefined inputs are skipped the same way as in [`ema_from`].
pub fn ema_seeded_first(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    let alpha = smoothing_factor(period);
    smooth_from(values, 1, 0, |avg, value| alpha * value + (1.0 - alpha) * avg)
}

/// Wilder's smoothed average of `values[start..]`.
///
/// Seeded like [`ema_from`], then
/// `avg[i] = (avg[i - 1] * (period - 1) + values[i]) / period`. Undefined
/// inputs yield undefined samples and the average is carried over them.
pub fn wilder(values: &[f64], period: usize, start: usize) -> Vec<f64> {
    let length = period as f64;
    let keep = period.saturating_sub(1) as f64;
    smooth_from(values, period, start, |avg, value| (avg * keep + value) / length)
}

fn smooth_from(
    values: &[f64],
    period: usize,
    start: usize,
    step: impl Fn(f64, f64) -> f64,
) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < start + period {
        return out;
    }
    let Some(seed_index) = first_defined_window(values, period, start) else {
        return out;
    };

    let mut avg = values[seed_index + 1 - period..=seed_index].iter().sum::<f64>() / period as f64;
    out[seed_index] = avg;
    for i in seed_index + 1..values.len() {
        if values[i].is_finite() {
            avg = step(avg, values[i]);
            out[i] = avg;
        }
    }

    out
}

/// Last index of the first run of `period` consecutive finite values at or
/// after `start`.
fn first_defined_window(values: &[f64], period: usize, start: usize) -> Option<usize> {
    let mut run = 0;
    for (i, value) in values.iter().enumerate().skip(start) {
        if value.is_finite() {
            run += 1;
            if run == period {
                return Some(i);
            }
        } else {
            run = 0;
        }
    }
    None
}

/// `max(high - low, |high - prev_close|, |low - prev_close|)`.
///
/// The first sample has no previous close and uses `high - low`. NaN when
/// any operand is undefined.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..high.len())
        .map(|i| {
            let hl = high[i] - low[i];
            if i == 0 {
                return if hl.is_finite() { hl } else { f64::NAN };
            }
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            if hl.is_finite() && hc.is_finite() && lc.is_finite() {
                hl.max(hc).max(lc)
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Lowest value over each trailing window of `period` samples; NaN for
/// windows holding an undefined sample.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_fold(values, period, f64::INFINITY, f64::min)
}

/// Highest value over each trailing window of `period` samples; NaN for
/// windows holding an undefined sample.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_fold(values, period, f64::NEG_INFINITY, f64::max)
}

fn rolling_fold(values: &[f64], period: usize, init: f64, op: fn(f64, f64) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    for i in period.saturating_sub(1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().all(|v| v.is_finite()) {
            out[i] = window.iter().copied().fold(init, op);
        }
    }
    out
}

/// Standard deviation around a moving mean.
///
/// `mean` is the SMA of `values` over the same `period`. Each sample
/// contributes its squared deviation from the mean at that sample; samples
/// before the first defined mean use the first defined mean. The squared
/// deviations are summed with the same running window as [`sma`], and
/// `std = sqrt(sum / period)`.
pub fn rolling_std_dev(values: &[f64], mean: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return vec![f64::NAN; values.len()];
    }

    let first = period - 1;
    let anchor = mean[first];
    let deviations: Vec<f64> = values
        .iter()
        .zip(mean)
        .enumerate()
        .map(|(i, (&value, &m))| {
            let m = if i < first { anchor } else { m };
            (value - m).powi(2)
        })
        .collect();

    sma(&deviations, period)
        .into_iter()
        .map(|variance| {
            if variance.is_nan() {
                f64::NAN
            } else {
                // running-sum rounding can dip just below zero
                variance.max(0.0).sqrt()
            }
        })
        .collect()
}

/// Stochastic %K: where `close` sits in `[lowest, highest]`, scaled to 0..100.
///
/// NaN when the range is empty.
pub fn percent_k(close: f64, lowest: f64, highest: f64) -> f64 {
    let range = highest - lowest;
    if range > 0.0 {
        (close - lowest) / range * 100.0
    } else {
        f64::NAN
    }
}
