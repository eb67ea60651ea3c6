pub mod accumulation;
pub mod atr;
pub mod bollinger;
pub mod ma;
pub mod macd;
pub mod momentum;
pub mod rsi;
pub mod stochastic;

use std::fmt;

use error_stack::{Report, bail};

use crate::alignment::AlignedSeries;
use crate::error::IndicatorError;
use crate::model::Field;
use crate::output::{IndicatorResult, Line};

use accumulation::AccumulationDistribution;
use atr::AverageTrueRange;
use bollinger::BollingerBand;
use ma::{ExponentialAverage, SimpleAverage, TriangularAverage};
use macd::Macd;
use momentum::Momentum;
use rsi::Rsi;
use stochastic::Stochastic;

/// A technical indicator computed over a whole [`AlignedSeries`].
///
/// Implementations are immutable parameter sets: `calculate` is a pure
/// function of the series, so calling it twice yields identical lines.
pub trait Indicator: Send + Sync {
    /// Short name of this indicator (e.g. "sma", "macd").
    fn name(&self) -> &str;

    /// OHLCV fields the indicator reads.
    fn required_fields(&self) -> &'static [Field];

    /// Minimum `DataCount` for every output line to have at least one
    /// defined sample.
    fn required_samples(&self) -> usize;

    /// Reject parameters that can never produce output.
    fn validate(&self) -> Result<(), Report<IndicatorError>>;

    /// Compute the output lines. Callers check fields and length first; see
    /// [`IndicatorKind::try_recompute`].
    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>>;
}

pub(crate) fn check_period(name: &str, period: usize) -> Result<(), Report<IndicatorError>> {
    if period == 0 {
        bail!(IndicatorError::InvalidParameter {
            name: format!("{name} must be > 0"),
        });
    }
    Ok(())
}

/// The closed set of supported indicators, each with its own parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorKind {
    SimpleAverage(SimpleAverage),
    TriangularAverage(TriangularAverage),
    ExponentialAverage(ExponentialAverage),
    AverageTrueRange(AverageTrueRange),
    BollingerBand(BollingerBand),
    Rsi(Rsi),
    Stochastic(Stochastic),
    Momentum(Momentum),
    Macd(Macd),
    AccumulationDistribution(AccumulationDistribution),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            IndicatorKind::SimpleAverage($inner) => $body,
            IndicatorKind::TriangularAverage($inner) => $body,
            IndicatorKind::ExponentialAverage($inner) => $body,
            IndicatorKind::AverageTrueRange($inner) => $body,
            IndicatorKind::BollingerBand($inner) => $body,
            IndicatorKind::Rsi($inner) => $body,
            IndicatorKind::Stochastic($inner) => $body,
            IndicatorKind::Momentum($inner) => $body,
            IndicatorKind::Macd($inner) => $body,
            IndicatorKind::AccumulationDistribution($inner) => $body,
        }
    };
}

impl Indicator for IndicatorKind {
    fn name(&self) -> &str {
        dispatch!(self, i => i.name())
    }

    fn required_fields(&self) -> &'static [Field] {
        dispatch!(self, i => i.required_fields())
    }

    fn required_samples(&self) -> usize {
        dispatch!(self, i => i.required_samples())
    }

    fn validate(&self) -> Result<(), Report<IndicatorError>> {
        dispatch!(self, i => i.validate())
    }

    fn calculate(&self, series: &AlignedSeries) -> Result<Vec<Line>, Report<IndicatorError>> {
        dispatch!(self, i => i.calculate(series))
    }
}

impl IndicatorKind {
    /// Recompute every line from scratch, or explain why the indicator is not
    /// drawable for this series.
    pub fn try_recompute(
        &self,
        series: &AlignedSeries,
    ) -> Result<IndicatorResult, Report<IndicatorError>> {
        self.validate()?;

        for &field in self.required_fields() {
            series.require(field)?;
        }

        let required = self.required_samples();
        if series.len() < required {
            bail!(IndicatorError::InsufficientData {
                required,
                available: series.len(),
            });
        }

        let lines = self.calculate(series)?;
        tracing::debug!(
            kind = self.name(),
            indicator = %self,
            data_count = series.len(),
            lines = lines.len(),
            "indicator recomputed"
        );
        Ok(IndicatorResult::new(lines))
    }

    /// Recompute every line from scratch.
    ///
    /// Never fails: insufficient data, invalid parameters and unbound fields
    /// all yield an empty result.
    pub fn recompute(&self, series: &AlignedSeries) -> IndicatorResult {
        match self.try_recompute(series) {
            Ok(result) => result,
            Err(report) => {
                tracing::debug!(
                    kind = self.name(),
                    indicator = %self,
                    error = ?report,
                    "indicator not drawable"
                );
                IndicatorResult::empty()
            }
        }
    }

    /// Parse a config kind name (with aliases) into its canonical form.
    pub fn canonical_name(kind: &str) -> Option<&'static str> {
        let normalized = kind.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let canonical = match normalized.as_str() {
            "simple_average" | "sma" => "simple_average",
            "triangular_average" | "tma" | "trima" => "triangular_average",
            "exponential_average" | "ema" => "exponential_average",
            "average_true_range" | "atr" => "average_true_range",
            "bollinger_band" | "bollinger" | "bb" => "bollinger_band",
            "rsi" => "rsi",
            "stochastic" | "stoch" => "stochastic",
            "momentum" => "momentum",
            "macd" => "macd",
            "accumulation_distribution" | "ad" => "accumulation_distribution",
            _ => return None,
        };
        Some(canonical)
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, i => fmt::Display::fmt(i, f))
    }
}

impl From<SimpleAverage> for IndicatorKind {
    fn from(i: SimpleAverage) -> Self {
        Self::SimpleAverage(i)
    }
}

impl From<TriangularAverage> for IndicatorKind {
    fn from(i: TriangularAverage) -> Self {
        Self::TriangularAverage(i)
    }
}

impl From<ExponentialAverage> for IndicatorKind {
    fn from(i: ExponentialAverage) -> Self {
        Self::ExponentialAverage(i)
    }
}

impl From<AverageTrueRange> for IndicatorKind {
    fn from(i: AverageTrueRange) -> Self {
        Self::AverageTrueRange(i)
    }
}

impl From<BollingerBand> for IndicatorKind {
    fn from(i: BollingerBand) -> Self {
        Self::BollingerBand(i)
    }
}

impl From<Rsi> for IndicatorKind {
    fn from(i: Rsi) -> Self {
        Self::Rsi(i)
    }
}

impl From<Stochastic> for IndicatorKind {
    fn from(i: Stochastic) -> Self {
        Self::Stochastic(i)
    }
}

impl From<Momentum> for IndicatorKind {
    fn from(i: Momentum) -> Self {
        Self::Momentum(i)
    }
}

impl From<Macd> for IndicatorKind {
    fn from(i: Macd) -> Self {
        Self::Macd(i)
    }
}

impl From<AccumulationDistribution> for IndicatorKind {
    fn from(i: AccumulationDistribution) -> Self {
        Self::AccumulationDistribution(i)
    }
}
