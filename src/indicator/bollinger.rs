use std::fmt;

use error_stack::{Report, bail};

use crate::alignment::AlignedSeries;
use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period};
use crate::model::Field;
use crate::output::{Line, LineName};
use crate::primitives::{rolling_std_dev, sma};

pub const DEFAULT_BAND_WIDTH: f64 = 2.0;

/// Bollinger Bands: an SMA signal with upper and lower bands
/// `band_width` standard deviations away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBand {
    period: usize,
    band_width: f64,
}

impl BollingerBand {
    pub fn new(period: usize, band_width: f64) -> Self {
        Self { period, band_width }
    }

    pub fn with_default_width(period: usize) -> Self {
        Self::new(period, DEFAULT_BAND_WIDTH)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn band_width(&self) -> f64 {
        self.band_width
    }
}

impl Indicator for BollingerBand {
    fn name(&self) -> &str {
        "bollinger"
    }

    fn required_fields(&self) -> &'static [Field] {
        &[Field::Close]
    }

    fn required_samples(&self) -> usize {
        self.period + 1
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        check_period("period", self.period)?;
        if !self.band_width.is_finite() || self.band_width < 0.0 {
            bail!(IndicatorError::InvalidParameter {
                name: "band_width must be finite and >= 0".into(),
            });
        }
        Ok(())
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        let close = series.require(Field::Close)?;
        let signal = sma(close, self.period);
        let std_dev = rolling_std_dev(close, &signal, self.period);

        let (upper, lower): (Vec<f64>, Vec<f64>) = signal
            .iter()
            .zip(&std_dev)
            .map(|(&mid, &sd)| {
                let offset = self.band_width * sd;
                (mid + offset, mid - offset)
            })
            .unzip();

        let warm_up = self.period - 1;
        let x = series.x();
        Ok(vec![
            Line::new(LineName::Upper, x, upper, warm_up),
            Line::new(LineName::Lower, x, lower, warm_up),
            Line::new(LineName::Signal, x, signal, warm_up),
        ])
    }
}

impl fmt::Display for BollingerBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BB({}, {})", self.period, self.band_width)
    }
}
