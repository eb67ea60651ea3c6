use std::fmt;

use error_stack::Report;

use crate::alignment::AlignedSeries;
use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period};
use crate::model::Field;
use crate::output::{Line, LineName};
use crate::primitives::{true_range, wilder};

/// Average True Range using Wilder's smoothing.
///
/// Seeded with the mean of the first `period` true ranges, defined from
/// `period - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AverageTrueRange {
    period: usize,
}

impl AverageTrueRange {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for AverageTrueRange {
    fn name(&self) -> &str {
        "atr"
    }

    fn required_fields(&self) -> &'static [Field] {
        &[Field::High, Field::Low, Field::Close]
    }

    fn required_samples(&self) -> usize {
        self.period + 1
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        check_period("period", self.period)
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        let high = series.require(Field::High)?;
        let low = series.require(Field::Low)?;
        let close = series.require(Field::Close)?;

        let tr = true_range(high, low, close);
        let signal = wilder(&tr, self.period, 0);

        Ok(vec![Line::new(
            LineName::Signal,
            series.x(),
            signal,
            self.period - 1,
        )])
    }
}

impl fmt::Display for AverageTrueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ATR({})", self.period)
    }
}
