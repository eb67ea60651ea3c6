use std::fmt;

use error_stack::Report;

use crate::alignment::AlignedSeries;
use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period};
use crate::model::Field;
use crate::output::{Line, LineName};
use crate::primitives::wilder;

/// Overbought reference level.
pub const RSI_UPPER: f64 = 70.0;
/// Oversold reference level.
pub const RSI_LOWER: f64 = 30.0;

/// RSI (Relative Strength Index) using Wilder's smoothing method.
///
/// Defined from index `period`: the first `period` price changes seed the
/// average gain and loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn required_fields(&self) -> &'static [Field] {
        &[Field::Close]
    }

    fn required_samples(&self) -> usize {
        self.period + 1
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        check_period("period", self.period)
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        let close = series.require(Field::Close)?;

        // index 0 has no previous close and is never part of a seed window;
        // a change touching an undefined close is itself undefined
        let mut gains = vec![0.0; close.len()];
        let mut losses = vec![0.0; close.len()];
        for i in 1..close.len() {
            let delta = close[i] - close[i - 1];
            if delta.is_nan() {
                gains[i] = f64::NAN;
                losses[i] = f64::NAN;
            } else {
                gains[i] = delta.max(0.0);
                losses[i] = (-delta).max(0.0);
            }
        }

        let avg_gain = wilder(&gains, self.period, 1);
        let avg_loss = wilder(&losses, self.period, 1);
        let signal = avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| rsi_value(g, l))
            .collect();

        let x = series.x();
        Ok(vec![
            Line::new(LineName::Signal, x, signal, self.period),
            Line::constant(LineName::Upper, x, RSI_UPPER),
            Line::constant(LineName::Lower, x, RSI_LOWER),
        ])
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        return f64::NAN;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

impl fmt::Display for Rsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RSI({})", self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::IndicatorKind;
    use crate::output::IndicatorResult;
    use crate::test_util::{assert_near, assert_undefined, closes, wave};

    fn rsi(period: usize, input: &[f64]) -> IndicatorResult {
        IndicatorKind::from(Rsi::new(period)).recompute(&closes(input))
    }

    fn signal(result: &IndicatorResult) -> Vec<f64> {
        result.line(LineName::Signal).unwrap().points().y_values().collect()
    }

    #[test]
    fn all_gains_returns_100() {
        let values = signal(&rsi(3, &[1.0, 2.0, 3.0, 4.0]));
        assert_undefined(values[2]);
        assert_eq!(values[3], 100.0);
    }

    #[test]
    fn all_losses_returns_0() {
        let values = signal(&rsi(3, &[4.0, 3.0, 2.0, 1.0]));
        assert_near(values[3], 0.0);
    }

    #[test]
    fn flat_prices_return_100() {
        let values = signal(&rsi(3, &[10.0; 6]));
        for v in &values[3..] {
            assert_eq!(*v, 100.0);
        }
    }

    #[test]
    fn known_value_with_wilder_step() {
        // deltas: +1, -1, +2, -2
        let values = signal(&rsi(2, &[10.0, 11.0, 10.0, 12.0, 10.0]));
        // seed: gain 0.5, loss 0.5 -> 50
        assert_near(values[2], 50.0);
        // gain (0.5 + 2) / 2 = 1.25, loss 0.25 -> rs 5
        assert_near(values[3], 100.0 - 100.0 / 6.0);
        // gain 0.625, loss (0.25 + 2) / 2 = 1.125
        assert_near(values[4], 100.0 - 100.0 / (1.0 + 0.625 / 1.125));
    }

    #[test]
    fn bounded_between_0_and_100() {
        for v in signal(&rsi(5, &wave(80))).into_iter().skip(5) {
            assert!((0.0..=100.0).contains(&v), "rsi out of range: {v}");
        }
    }

    #[test]
    fn missing_close_undefines_only_the_changes_touching_it() {
        let mut input = wave(60);
        input[20] = f64::NAN;
        let values = signal(&rsi(5, &input));
        assert!(values[5..20].iter().all(|v| v.is_finite()));
        // both close[20] - close[19] and close[21] - close[20] are unknown
        assert_undefined(values[20]);
        assert_undefined(values[21]);
        assert!(values[22..].iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn reference_levels_span_every_sample() {
        let result = rsi(3, &wave(10));
        let upper = result.line(LineName::Upper).unwrap();
        let lower = result.line(LineName::Lower).unwrap();
        assert_eq!(upper.warm_up(), 0);
        assert!(upper.points().y_values().all(|v| v == RSI_UPPER));
        assert!(lower.points().y_values().all(|v| v == RSI_LOWER));
        assert_eq!(result.line(LineName::Signal).unwrap().warm_up(), 3);
    }
}
