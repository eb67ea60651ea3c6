use std::fmt;

use error_stack::Report;

use crate::alignment::AlignedSeries;
use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period};
use crate::model::Field;
use crate::output::{Line, LineName};
use crate::primitives::{ema, ema_from};

/// Moving Average Convergence Divergence.
///
/// The MACD line is `EMA(short) - EMA(long)`; the signal line is an EMA of
/// the MACD line seeded with the mean of its first `period` defined values.
/// With the histogram enabled, `macd - signal` is emitted as bars paired
/// with a zero baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macd {
    short_period: usize,
    long_period: usize,
    period: usize,
    histogram: bool,
}

impl Macd {
    pub fn new(short_period: usize, long_period: usize, period: usize) -> Self {
        Self {
            short_period,
            long_period,
            period,
            histogram: true,
        }
    }

    pub fn with_histogram(mut self, histogram: bool) -> Self {
        self.histogram = histogram;
        self
    }

    pub fn short_period(&self) -> usize {
        self.short_period
    }

    pub fn long_period(&self) -> usize {
        self.long_period
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn histogram(&self) -> bool {
        self.histogram
    }

    // Either EMA may be the slower one; the difference needs both.
    fn macd_start(&self) -> usize {
        self.short_period.max(self.long_period).saturating_sub(1)
    }

    fn signal_start(&self) -> usize {
        (self.macd_start() + self.period).saturating_sub(1)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "macd"
    }

    fn required_fields(&self) -> &'static [Field] {
        &[Field::Close]
    }

    fn required_samples(&self) -> usize {
        self.signal_start() + 1
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        check_period("short_period", self.short_period)?;
        check_period("long_period", self.long_period)?;
        check_period("period", self.period)
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        let close = series.require(Field::Close)?;

        let short = ema(close, self.short_period);
        let long = ema(close, self.long_period);
        let macd: Vec<f64> = short.iter().zip(&long).map(|(s, l)| s - l).collect();
        let signal = ema_from(&macd, self.period, self.macd_start());

        let histogram: Option<Vec<f64>> = self
            .histogram
            .then(|| macd.iter().zip(&signal).map(|(m, s)| m - s).collect());

        let x = series.x();
        let signal_start = self.signal_start();
        let mut lines = vec![
            Line::new(LineName::MacdLine, x, macd, self.macd_start()),
            Line::new(LineName::SignalLine, x, signal, signal_start),
            Line::constant(LineName::Center, x, 0.0),
        ];

        if let Some(top) = histogram {
            lines.push(Line::new(LineName::HistogramTop, x, top, signal_start).as_bars());
            lines.push(
                Line::new(LineName::HistogramBase, x, vec![0.0; x.len()], signal_start).as_bars(),
            );
        }

        Ok(lines)
    }
}

impl fmt::Display for Macd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MACD({}, {}, {})",
            self.short_period, self.long_period, self.period
        )
    }
}
