use std::fmt;

use error_stack::Report;

use crate::alignment::AlignedSeries;
use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period};
use crate::model::Field;
use crate::output::{Line, LineName};
use crate::primitives::{percent_k, rolling_max, rolling_min, sma};

pub const STOCHASTIC_UPPER: f64 = 80.0;
pub const STOCHASTIC_LOWER: f64 = 20.0;

/// Stochastic oscillator.
///
/// Raw %K places the close within the high/low range of the last `period`
/// bars and is emitted from index `period`. The period line is the
/// `k_period` SMA of raw %K and the signal (%D) is the `d_period` SMA of the
/// period line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stochastic {
    period: usize,
    k_period: usize,
    d_period: usize,
}

impl Stochastic {
    pub fn new(period: usize, k_period: usize, d_period: usize) -> Self {
        Self {
            period,
            k_period,
            d_period,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn k_period(&self) -> usize {
        self.k_period
    }

    pub fn d_period(&self) -> usize {
        self.d_period
    }

    fn period_line_start(&self) -> usize {
        (self.period + self.k_period).saturating_sub(1)
    }

    fn signal_start(&self) -> usize {
        (self.period_line_start() + self.d_period).saturating_sub(1)
    }

    /// Raw %K for every sample; NaN before `period` and where the window's
    /// high equals its low.
    pub fn raw_k(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let lowest = rolling_min(low, self.period);
        let highest = rolling_max(high, self.period);
        (0..close.len())
            .map(|i| {
                if i < self.period {
                    f64::NAN
                } else {
                    percent_k(close[i], lowest[i], highest[i])
                }
            })
            .collect()
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        "stochastic"
    }

    fn required_fields(&self) -> &'static [Field] {
        &[Field::High, Field::Low, Field::Close]
    }

    fn required_samples(&self) -> usize {
        self.signal_start() + 1
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        check_period("period", self.period)?;
        check_period("k_period", self.k_period)?;
        check_period("d_period", self.d_period)
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        let high = series.require(Field::High)?;
        let low = series.require(Field::Low)?;
        let close = series.require(Field::Close)?;

        let raw = self.raw_k(high, low, close);
        let period_line = sma(&raw, self.k_period);
        let signal = sma(&period_line, self.d_period);

        let x = series.x();
        Ok(vec![
            Line::new(LineName::PeriodLine, x, period_line, self.period_line_start()),
            Line::new(LineName::Signal, x, signal, self.signal_start()),
            Line::constant(LineName::Upper, x, STOCHASTIC_UPPER),
            Line::constant(LineName::Lower, x, STOCHASTIC_LOWER),
        ])
    }
}

impl fmt::Display for Stochastic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stochastic({}, {}, {})",
            self.period, self.k_period, self.d_period
        )
    }
}
