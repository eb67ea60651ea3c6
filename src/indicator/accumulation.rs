use std::fmt;

use error_stack::Report;

use crate::alignment::AlignedSeries;
use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::model::Field;
use crate::output::{Line, LineName};

/// Accumulation/Distribution line: running total of volume weighted by where
/// the close sits within the bar's range.
///
/// A bar with `high == low` (or any undefined input) adds nothing and its own
/// sample is undefined. A bar with `close == 0` adds nothing but still
/// reports the running total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulationDistribution;

impl AccumulationDistribution {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for AccumulationDistribution {
    fn name(&self) -> &str {
        "ad"
    }

    fn required_fields(&self) -> &'static [Field] {
        &[Field::High, Field::Low, Field::Close, Field::Volume]
    }

    fn required_samples(&self) -> usize {
        1
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        Ok(())
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        let high = series.require(Field::High)?;
        let low = series.require(Field::Low)?;
        let close = series.require(Field::Close)?;
        let volume = series.require(Field::Volume)?;

        let mut total = 0.0;
        let signal = (0..close.len())
            .map(|i| {
                let range = high[i] - low[i];
                if close[i] == 0.0 {
                    return total;
                }
                let term = volume[i] * ((close[i] - low[i]) - (high[i] - close[i])) / range;
                if range == 0.0 || !term.is_finite() {
                    return f64::NAN;
                }
                total += term;
                total
            })
            .collect();

        Ok(vec![Line::new(LineName::Signal, series.x(), signal, 0)])
    }
}

impl fmt::Display for AccumulationDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AD")
    }
}
