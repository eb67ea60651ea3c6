use std::fmt;

use error_stack::Report;

use crate::alignment::AlignedSeries;
use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period};
use crate::model::Field;
use crate::output::{Line, LineName};

/// Level momentum oscillates around when prices are unchanged.
pub const MOMENTUM_CENTER: f64 = 100.0;

/// Momentum as a percentage of the close `period` bars ago.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Momentum {
    period: usize,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        "momentum"
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

        let signal = (0..close.len())
            .map(|i| {
                if i < self.period {
                    return f64::NAN;
                }
                let previous = close[i - self.period];
                if previous == 0.0 {
                    f64::NAN
                } else {
                    close[i] / previous * 100.0
                }
            })
            .collect();

        let x = series.x();
        Ok(vec![
            Line::new(LineName::Signal, x, signal, self.period),
            Line::constant(LineName::Center, x, MOMENTUM_CENTER),
        ])
    }
}

impl fmt::Display for Momentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Momentum({})", self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::IndicatorKind;
    use crate::test_util::{assert_near, assert_undefined, closes};

    #[test]
    fn ratio_to_close_period_bars_ago() {
        let input = [10.0, 20.0, 15.0, 30.0, 10.0];
        let result = IndicatorKind::from(Momentum::new(2)).recompute(&closes(&input));
        let line = result.line(LineName::Signal).unwrap();
        assert_eq!(line.warm_up(), 2);
        assert_undefined(line.value_at(1).unwrap());
        assert_near(line.value_at(2).unwrap(), 150.0);
        assert_near(line.value_at(3).unwrap(), 150.0);
        assert_near(line.value_at(4).unwrap(), 10.0 / 15.0 * 100.0);
    }

    #[test]
    fn zero_reference_close_is_undefined_sample() {
        let input = [0.0, 5.0, 10.0, 20.0];
        let result = IndicatorKind::from(Momentum::new(1)).recompute(&closes(&input));
        let line = result.line(LineName::Signal).unwrap();
        assert_undefined(line.value_at(1).unwrap());
        assert_near(line.value_at(2).unwrap(), 200.0);
    }

    #[test]
    fn flat_prices_sit_on_center() {
        let result = IndicatorKind::from(Momentum::new(3)).recompute(&closes(&[42.0; 8]));
        let signal = result.line(LineName::Signal).unwrap();
        let center = result.line(LineName::Center).unwrap();
        for p in signal.visible_points() {
            assert_eq!(p.y, MOMENTUM_CENTER);
        }
        assert!(center.points().y_values().all(|v| v == MOMENTUM_CENTER));
    }

    #[test]
    fn display() {
        assert_eq!(Momentum::new(14).to_string(), "Momentum(14)");
    }
}
