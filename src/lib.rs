pub mod alignment;
pub mod config;
pub mod error;
pub mod indicator;
pub mod model;
pub mod notifier;
pub mod output;
pub mod primitives;
pub mod recompute;
pub mod technical;

#[cfg(test)]
mod test_util;

pub use alignment::{AlignedSeries, SourceRecord, align};
pub use indicator::{Indicator, IndicatorKind};
pub use model::{AxisAssociation, Field, FieldBindings};
pub use output::{IndicatorResult, Line, LineName, Range};
pub use technical::TechnicalIndicator;
