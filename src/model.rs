use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the OHLCV fields an indicator can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
    ];

    /// Parse a config-format field name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "high" => Some(Self::High),
            "low" => Some(Self::Low),
            "close" => Some(Self::Close),
            "volume" => Some(Self::Volume),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Open => 0,
            Self::High => 1,
            Self::Low => 2,
            Self::Close => 3,
            Self::Volume => 4,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Names of the source-record members that feed each OHLCV field.
///
/// An unset (or empty) name means the field is not available. When `x` is
/// unset the sample index is used as the X value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldBindings {
    pub x: Option<String>,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
}

impl FieldBindings {
    /// Bindings where every OHLCV field reads the member of the same name.
    pub fn ohlcv() -> Self {
        Self {
            x: None,
            open: Some("open".into()),
            high: Some("high".into()),
            low: Some("low".into()),
            close: Some("close".into()),
            volume: Some("volume".into()),
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.raw(field).filter(|n| !n.is_empty())
    }

    /// The configured name, empty strings included.
    pub fn raw(&self, field: Field) -> Option<&str> {
        let name = match field {
            Field::Open => &self.open,
            Field::High => &self.high,
            Field::Low => &self.low,
            Field::Close => &self.close,
            Field::Volume => &self.volume,
        };
        name.as_deref()
    }

    pub fn x(&self) -> Option<&str> {
        self.x.as_deref().filter(|n| !n.is_empty())
    }

    pub fn set(&mut self, field: Field, name: Option<String>) {
        let slot = match field {
            Field::Open => &mut self.open,
            Field::High => &mut self.high,
            Field::Low => &mut self.low,
            Field::Close => &mut self.close,
            Field::Volume => &mut self.volume,
        };
        *slot = name;
    }

    #[must_use]
    pub fn with(mut self, field: Field, name: &str) -> Self {
        self.set(field, Some(name.to_string()));
        self
    }

    #[must_use]
    pub fn with_x(mut self, name: &str) -> Self {
        self.x = Some(name.to_string());
        self
    }

    /// Overlay every binding that `overrides` sets on top of `self`.
    #[must_use]
    pub fn merged(mut self, overrides: &FieldBindings) -> Self {
        if overrides.x.is_some() {
            self.x.clone_from(&overrides.x);
        }
        for field in Field::ALL {
            if let Some(name) = overrides.get(field) {
                self.set(field, Some(name.to_string()));
            }
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Which chart axes an indicator is drawn against.
///
/// Only affects rendering: a transposed association makes the vertical axis
/// the X driver. The numbers never change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisAssociation {
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub transposed: bool,
}

impl AxisAssociation {
    pub fn x_orientation(&self) -> AxisOrientation {
        if self.transposed {
            AxisOrientation::Vertical
        } else {
            AxisOrientation::Horizontal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
