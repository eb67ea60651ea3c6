use std::fmt;

use error_stack::Report;

use crate::alignment::AlignedSeries;
use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period};
use crate::model::Field;
use crate::output::{Line, LineName};
use crate::primitives::{ema_seeded_first, fill_running_mean, sma};

const CLOSE: &[Field] = &[Field::Close];

/// Simple Moving Average of the close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleAverage {
    period: usize,
}

impl SimpleAverage {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for SimpleAverage {
    fn name(&self) -> &str {
        "sma"
    }

    fn required_fields(&self) -> &'static [Field] {
        CLOSE
    }

    fn required_samples(&self) -> usize {
        self.period + 1
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        check_period("period", self.period)
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        let close = series.require(Field::Close)?;
        let signal = sma(close, self.period);
        Ok(vec![Line::new(
            LineName::Signal,
            series.x(),
            signal,
            self.period - 1,
        )])
    }
}

impl fmt::Display for SimpleAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SMA({})", self.period)
    }
}

/// Triangular Moving Average: an SMA of an SMA.
///
/// The first pass has no value for its first `period - 1` samples; those are
/// filled with the mean of the closes seen so far so the second pass is
/// defined from `period - 1` as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangularAverage {
    period: usize,
}

impl TriangularAverage {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for TriangularAverage {
    fn name(&self) -> &str {
        "tma"
    }

    fn required_fields(&self) -> &'static [Field] {
        CLOSE
    }

    fn required_samples(&self) -> usize {
        self.period + 1
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        check_period("period", self.period)
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        let close = series.require(Field::Close)?;
        let mut first_pass = sma(close, self.period);
        fill_running_mean(&mut first_pass, close, self.period);
        let signal = sma(&first_pass, self.period);
        Ok(vec![Line::new(
            LineName::Signal,
            series.x(),
            signal,
            self.period - 1,
        )])
    }
}

impl fmt::Display for TriangularAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TMA({})", self.period)
    }
}

/// Exponential Moving Average of the close, seeded with the first close so it
/// is defined from the first sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialAverage {
    period: usize,
}

impl ExponentialAverage {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for ExponentialAverage {
    fn name(&self) -> &str {
        "ema"
    }

    fn required_fields(&self) -> &'static [Field] {
        CLOSE
    }

    fn required_samples(&self) -> usize {
        self.period + 1
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        check_period("period", self.period)
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        let close = series.require(Field::Close)?;
        let signal = ema_seeded_first(close, self.period);
        Ok(vec![Line::new(LineName::Signal, series.x(), signal, 0)])
    }
}

impl fmt::Display for ExponentialAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EMA({})", self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::IndicatorKind;
    use crate::output::IndicatorResult;
    use crate::primitives::smoothing_factor;
    use crate::test_util::{assert_near, assert_undefined, closes, wave};

    fn signal(result: &IndicatorResult) -> Vec<f64> {
        result
            .line(LineName::Signal)
            .expect("signal line")
            .points()
            .y_values()
            .collect()
    }

    #[test]
    fn sma_known_values() {
        let result =
            IndicatorKind::from(SimpleAverage::new(3)).recompute(&closes(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let values = signal(&result);
        assert_undefined(values[0]);
        assert_undefined(values[1]);
        assert_near(values[2], 2.0);
        assert_near(values[3], 3.0);
        assert_near(values[4], 4.0);
        assert_eq!(result.line(LineName::Signal).unwrap().warm_up(), 2);
    }

    #[test]
    fn sma_flat_prices() {
        let result = IndicatorKind::from(SimpleAverage::new(3)).recompute(&closes(&[10.0; 6]));
        for v in &signal(&result)[2..] {
            assert_near(*v, 10.0);
        }
    }

    #[test]
    fn sma_period_equal_to_count_is_empty() {
        let result = IndicatorKind::from(SimpleAverage::new(5)).recompute(&closes(&[1.0; 5]));
        assert!(result.is_empty());
    }

    #[test]
    fn sma_period_one_is_identity() {
        let input = [3.0, 1.0, 4.0];
        let result = IndicatorKind::from(SimpleAverage::new(1)).recompute(&closes(&input));
        assert_eq!(signal(&result), input);
    }

    #[test]
    fn tma_smooths_twice() {
        let input = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let result = IndicatorKind::from(TriangularAverage::new(3)).recompute(&closes(&input));
        let values = signal(&result);
        // first pass: 1, 1.5, 2, 3, 4, 5
        assert_undefined(values[1]);
        assert_near(values[2], (1.0 + 1.5 + 2.0) / 3.0);
        assert_near(values[3], (1.5 + 2.0 + 3.0) / 3.0);
        assert_near(values[5], 4.0);
    }

    #[test]
    fn tma_flat_prices() {
        let result = IndicatorKind::from(TriangularAverage::new(4)).recompute(&closes(&[7.5; 9]));
        for v in &signal(&result)[3..] {
            assert_near(*v, 7.5);
        }
    }

    #[test]
    fn ema_starts_at_first_close() {
        let input = [10.0, 20.0, 30.0, 40.0];
        let result = IndicatorKind::from(ExponentialAverage::new(3)).recompute(&closes(&input));
        let values = signal(&result);
        let alpha = smoothing_factor(3);
        assert_eq!(values[0], 10.0);
        for i in 1..input.len() {
            assert_eq!(values[i], alpha * input[i] + (1.0 - alpha) * values[i - 1]);
        }
        assert_eq!(result.line(LineName::Signal).unwrap().warm_up(), 0);
    }

    #[test]
    fn ema_recovers_after_missing_close() {
        let mut input = wave(60);
        input[20] = f64::NAN;
        let values = signal(&IndicatorKind::from(ExponentialAverage::new(5)).recompute(&closes(&input)));
        assert_undefined(values[20]);
        for (i, v) in values.iter().enumerate().filter(|(i, _)| *i != 20) {
            assert!(v.is_finite(), "undefined at {i}");
        }
    }

    #[test]
    fn display() {
        assert_eq!(TriangularAverage::new(9).to_string(), "TMA(9)");
        assert_eq!(ExponentialAverage::new(14).to_string(), "EMA(14)");
    }
}
