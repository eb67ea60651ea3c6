use chrono::DateTime;
use error_stack::{Report, bail};
use serde_json::Value;

use crate::error::{AlignmentError, IndicatorError};
use crate::model::{Candle, Field, FieldBindings};

/// A source record that exposes numeric members by name.
///
/// Implement this on the host's record type to let [`align`] extract the bound
/// OHLCV fields without an intermediate conversion.
pub trait SourceRecord {
    /// Numeric value of the member called `name`, or `None` if the record
    /// has no such member or it is not numeric.
    fn field(&self, name: &str) -> Option<f64>;
}

impl SourceRecord for Value {
    fn field(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().or_else(|| {
                DateTime::parse_from_rfc3339(s.trim())
                    .ok()
                    .map(|t| t.timestamp_millis() as f64)
            }),
            _ => None,
        }
    }
}

impl SourceRecord for Candle {
    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "open_time" | "time" | "timestamp" => Some(self.open_time.timestamp_millis() as f64),
            "open" => Some(self.open),
            "high" => Some(self.high),
            "low" => Some(self.low),
            "close" => Some(self.close),
            "volume" => Some(self.volume),
            _ => None,
        }
    }
}

/// Equal-length OHLCV arrays indexed `0..len()`.
///
/// Only the fields an indicator needs have to be present. `x` is
/// non-decreasing and has one entry per sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSeries {
    x: Vec<f64>,
    fields: [Option<Vec<f64>>; 5],
}

impl AlignedSeries {
    /// Series with `DataCount = 0`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder(x: Vec<f64>) -> AlignedSeriesBuilder {
        AlignedSeriesBuilder {
            x,
            fields: Default::default(),
        }
    }

    /// Builder whose X values are the sample indices `0..len`.
    pub fn indexed(len: usize) -> AlignedSeriesBuilder {
        Self::builder((0..len).map(|i| i as f64).collect())
    }

    /// All five fields, with the candle open time (epoch milliseconds) as X.
    pub fn from_candles(candles: &[Candle]) -> Result<Self, Report<AlignmentError>> {
        let x = candles
            .iter()
            .map(|c| c.open_time.timestamp_millis() as f64)
            .collect();
        let mut builder = Self::builder(x);
        for field in Field::ALL {
            let values = candles.iter().map(|c| c.field(field.as_str()).unwrap_or(f64::NAN));
            builder = builder.with(field, values.collect());
        }
        builder.build()
    }

    /// Number of aligned samples (`DataCount`).
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn field(&self, field: Field) -> Option<&[f64]> {
        self.fields[field.slot()].as_deref()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields[field.slot()].is_some()
    }

    /// The values of `field`, or a [`IndicatorError::MissingField`] report.
    pub fn require(&self, field: Field) -> Result<&[f64], Report<IndicatorError>> {
        match self.field(field) {
            Some(values) => Ok(values),
            None => bail!(IndicatorError::MissingField { field }),
        }
    }
}

pub struct AlignedSeriesBuilder {
    x: Vec<f64>,
    fields: [Option<Vec<f64>>; 5],
}

impl AlignedSeriesBuilder {
    #[must_use]
    pub fn with(mut self, field: Field, values: Vec<f64>) -> Self {
        self.fields[field.slot()] = Some(values);
        self
    }

    pub fn build(self) -> Result<AlignedSeries, Report<AlignmentError>> {
        let expected = self.x.len();
        for field in Field::ALL {
            if let Some(values) = &self.fields[field.slot()] {
                if values.len() != expected {
                    bail!(AlignmentError::LengthMismatch {
                        field,
                        expected,
                        actual: values.len(),
                    });
                }
            }
        }

        if let Some(index) = self.x.iter().position(|x| x.is_nan()) {
            bail!(AlignmentError::NonMonotonicX { index });
        }
        if let Some(index) = self.x.windows(2).position(|w| w[1] < w[0]) {
            bail!(AlignmentError::NonMonotonicX { index: index + 1 });
        }

        Ok(AlignedSeries {
            x: self.x,
            fields: self.fields,
        })
    }
}

/// Extract the `required` fields of every record into an [`AlignedSeries`].
///
/// Returns an empty series when `records` is empty, when a required field has
/// no binding, or when the bound X values are not non-decreasing. A bound
/// member missing from a single record becomes `NaN` for that sample.
pub fn align<R: SourceRecord>(
    records: &[R],
    bindings: &FieldBindings,
    required: &[Field],
) -> AlignedSeries {
    if records.is_empty() {
        return AlignedSeries::empty();
    }

    if let Some(field) = required.iter().find(|f| bindings.get(**f).is_none()) {
        tracing::warn!(field = %field, "required field binding is unset");
        return AlignedSeries::empty();
    }

    let x = match bindings.x() {
        Some(name) => extract(records, name),
        None => (0..records.len()).map(|i| i as f64).collect(),
    };

    let mut builder = AlignedSeries::builder(x);
    for &field in required {
        if let Some(name) = bindings.get(field) {
            builder = builder.with(field, extract(records, name));
        }
    }

    match builder.build() {
        Ok(series) => series,
        Err(report) => {
            tracing::warn!(error = ?report, "source records could not be aligned");
            AlignedSeries::empty()
        }
    }
}

fn extract<R: SourceRecord>(records: &[R], name: &str) -> Vec<f64> {
    let mut missing = 0usize;
    let values = records
        .iter()
        .map(|r| {
            r.field(name).unwrap_or_else(|| {
                missing += 1;
                f64::NAN
            })
        })
        .collect();
    if missing > 0 {
        tracing::debug!(member = name, missing, "records without a numeric value");
    }
    values
}
