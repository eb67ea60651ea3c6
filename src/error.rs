use derive_more::{Display, Error};

use crate::model::Field;

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum InputError {
    #[display("failed to read input file")]
    ReadFile,
    #[display("failed to parse input: {reason}")]
    Parse { reason: String },
}

#[derive(Debug, Display, Error)]
pub enum AlignmentError {
    #[display("{field} has {actual} samples, expected {expected}")]
    LengthMismatch {
        field: Field,
        expected: usize,
        actual: usize,
    },
    #[display("x values must be non-decreasing and defined (first offending index {index})")]
    NonMonotonicX { index: usize },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("insufficient data: need {required}, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
    #[display("field {field} is not bound")]
    MissingField { field: Field },
}
