use std::collections::HashSet;
use std::path::{Path, PathBuf};

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::indicator::IndicatorKind;
use crate::indicator::accumulation::AccumulationDistribution;
use crate::indicator::atr::AverageTrueRange;
use crate::indicator::bollinger::{BollingerBand, DEFAULT_BAND_WIDTH};
use crate::indicator::ma::{ExponentialAverage, SimpleAverage, TriangularAverage};
use crate::indicator::macd::Macd;
use crate::indicator::momentum::Momentum;
use crate::indicator::rsi::Rsi;
use crate::indicator::stochastic::Stochastic;
use crate::model::{AxisAssociation, Field, FieldBindings};
use crate::technical::TechnicalIndicator;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub indicators: Vec<IndicatorConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InputConfig {
    /// JSON array of records; the `--input` flag takes precedence.
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub fields: FieldBindings,
}

impl InputConfig {
    /// Same-name OHLCV bindings overlaid with the configured ones.
    pub fn bindings(&self) -> FieldBindings {
        FieldBindings::ohlcv().merged(&self.fields)
    }
}

#[derive(Debug, Deserialize)]
pub struct IndicatorConfig {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub params: toml::Table,
    /// Per-indicator overrides of the input bindings.
    #[serde(default)]
    pub fields: FieldBindings,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    #[serde(default)]
    pub transposed: bool,
}

impl IndicatorConfig {
    pub fn axes(&self) -> AxisAssociation {
        AxisAssociation {
            x_axis: self.x_axis.clone(),
            y_axis: self.y_axis.clone(),
            transposed: self.transposed,
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig, Report<ConfigError>> {
    let config: AppConfig = toml::from_str(content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const LOG_FORMATS: &[&str] = &["text", "json"];

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_log_format(config)?;
    validate_indicator_names_unique(config)?;
    validate_bindings(config)?;
    for indicator in &config.indicators {
        build_indicator(indicator)?;
    }
    Ok(())
}

fn validate_log_format(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if !LOG_FORMATS.contains(&config.general.log_format.as_str()) {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "general.log_format \"{}\" must be \"text\" or \"json\"",
                config.general.log_format
            ),
        }));
    }
    Ok(())
}

fn validate_indicator_names_unique(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let mut seen = HashSet::new();
    for indicator in &config.indicators {
        if !seen.insert(indicator.name.as_str()) {
            return Err(Report::new(ConfigError::Validation {
                field: format!("indicators: duplicate name \"{}\"", indicator.name),
            }));
        }
    }
    Ok(())
}

fn validate_bindings(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let sections = std::iter::once(("input.fields".to_string(), &config.input.fields)).chain(
        config
            .indicators
            .iter()
            .map(|i| (format!("indicators[\"{}\"].fields", i.name), &i.fields)),
    );

    for (section, bindings) in sections {
        if bindings.x.as_deref() == Some("") {
            return Err(Report::new(ConfigError::Validation {
                field: format!("{section}.x must not be empty"),
            }));
        }
        for field in Field::ALL {
            if bindings.raw(field) == Some("") {
                return Err(Report::new(ConfigError::Validation {
                    field: format!("{section}.{field} must not be empty"),
                }));
            }
        }
    }
    Ok(())
}

/// Build the [`IndicatorKind`] an indicator entry describes.
pub fn build_indicator(config: &IndicatorConfig) -> Result<IndicatorKind, Report<ConfigError>> {
    let Some(kind) = IndicatorKind::canonical_name(&config.kind) else {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "indicators[\"{}\"].kind \"{}\" is not a known indicator",
                config.name, config.kind
            ),
        }));
    };

    let period = || get_usize(config, "period");
    let built: IndicatorKind = match kind {
        "simple_average" => SimpleAverage::new(period()?).into(),
        "triangular_average" => TriangularAverage::new(period()?).into(),
        "exponential_average" => ExponentialAverage::new(period()?).into(),
        "average_true_range" => AverageTrueRange::new(period()?).into(),
        "bollinger_band" => {
            let width = get_f64_or(config, "band_width", DEFAULT_BAND_WIDTH)?;
            BollingerBand::new(period()?, width).into()
        }
        "rsi" => Rsi::new(period()?).into(),
        "stochastic" => Stochastic::new(
            period()?,
            get_usize(config, "k_period")?,
            get_usize(config, "d_period")?,
        )
        .into(),
        "momentum" => Momentum::new(period()?).into(),
        "macd" => Macd::new(
            get_usize(config, "short_period")?,
            get_usize(config, "long_period")?,
            period()?,
        )
        .with_histogram(get_bool_or(config, "histogram", true)?)
        .into(),
        // accumulation_distribution
        _ => AccumulationDistribution::new().into(),
    };
    Ok(built)
}

/// Build a [`TechnicalIndicator`] bound to `input` with the entry's overrides.
pub fn build_technical(
    config: &IndicatorConfig,
    input: &FieldBindings,
) -> Result<TechnicalIndicator, Report<ConfigError>> {
    let kind = build_indicator(config)?;
    Ok(TechnicalIndicator::new(config.name.clone(), kind)
        .with_bindings(input.clone().merged(&config.fields))
        .with_axes(config.axes()))
}

fn param_error(config: &IndicatorConfig, key: &str, problem: &str) -> Report<ConfigError> {
    Report::new(ConfigError::Validation {
        field: format!("indicators[\"{}\"].params.{key} {problem}", config.name),
    })
}

fn get_usize(config: &IndicatorConfig, key: &str) -> Result<usize, Report<ConfigError>> {
    let value = config
        .params
        .get(key)
        .ok_or_else(|| param_error(config, key, "is required"))?;
    value
        .as_integer()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| param_error(config, key, "must be a non-negative integer"))
}

fn get_f64_or(config: &IndicatorConfig, key: &str, default: f64) -> Result<f64, Report<ConfigError>> {
    match config.params.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_float()
            .or_else(|| value.as_integer().map(|n| n as f64))
            .ok_or_else(|| param_error(config, key, "must be a number")),
    }
}

fn get_bool_or(config: &IndicatorConfig, key: &str, default: bool) -> Result<bool, Report<ConfigError>> {
    match config.params.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| param_error(config, key, "must be true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_raw(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    fn kind_of(toml: &str) -> Result<IndicatorKind, Report<ConfigError>> {
        let config = parse_raw(toml);
        build_indicator(&config.indicators[0])
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[input]
path = "bars.json"

[input.fields]
x = "time"
close = "close"

[[indicators]]
name = "sma-20"
kind = "sma"
params = { period = 20 }
fields = { close = "adj_close" }
x_axis = "time"
y_axis = "price"

[[indicators]]
name = "macd"
kind = "macd"
params = { short_period = 12, long_period = 26, period = 9, histogram = false }
transposed = true
"#;
        let config = parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.input.path, Some(PathBuf::from("bars.json")));
        assert_eq!(config.indicators.len(), 2);
        assert!(config.indicators[1].axes().transposed);

        let macd = build_indicator(&config.indicators[1]).unwrap();
        assert_eq!(macd, IndicatorKind::from(Macd::new(12, 26, 9).with_histogram(false)));
    }

    #[test]
    fn defaults_applied_when_fields_omitted() {
        let config = parse_raw("");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert!(config.input.path.is_none());
        assert!(config.indicators.is_empty());
        assert_eq!(config.input.bindings(), FieldBindings::ohlcv());
    }

    #[test]
    fn input_bindings_overlay_defaults() {
        let config = parse_raw(
            r#"
[input.fields]
x = "time"
close = "last"
"#,
        );
        let bindings = config.input.bindings();
        assert_eq!(bindings.x(), Some("time"));
        assert_eq!(bindings.get(Field::Close), Some("last"));
        assert_eq!(bindings.get(Field::High), Some("high"));
    }

    #[test]
    fn technical_merges_indicator_overrides() {
        let config = parse_raw(
            r#"
[[indicators]]
name = "sma"
kind = "sma"
params = { period = 3 }
fields = { close = "adj_close" }
y_axis = "price"
"#,
        );
        let technical = build_technical(&config.indicators[0], &config.input.bindings()).unwrap();
        assert_eq!(technical.label(), "sma");
        assert_eq!(technical.bindings().get(Field::Close), Some("adj_close"));
        assert_eq!(technical.bindings().get(Field::Volume), Some("volume"));
        assert_eq!(technical.axes().y_axis.as_deref(), Some("price"));
    }

    #[test]
    fn aliases_and_defaults_build_kinds() {
        let bb = kind_of(
            r#"
[[indicators]]
name = "bb"
kind = "Bollinger"
params = { period = 20 }
"#,
        )
        .unwrap();
        assert_eq!(bb, IndicatorKind::from(BollingerBand::with_default_width(20)));

        let bb_int_width = kind_of(
            r#"
[[indicators]]
name = "bb"
kind = "bb"
params = { period = 20, band_width = 3 }
"#,
        )
        .unwrap();
        assert_eq!(bb_int_width, IndicatorKind::from(BollingerBand::new(20, 3.0)));

        let ad = kind_of(
            r#"
[[indicators]]
name = "ad"
kind = "ad"
"#,
        )
        .unwrap();
        assert_eq!(ad, IndicatorKind::from(AccumulationDistribution::new()));
    }

    #[test]
    fn unknown_kind_rejected() {
        let result = parse(
            r#"
[[indicators]]
name = "vwap"
kind = "vwap"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_period_rejected() {
        let result = kind_of(
            r#"
[[indicators]]
name = "stoch"
kind = "stochastic"
params = { period = 14, k_period = 3 }
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn negative_or_fractional_period_rejected() {
        for params in ["{ period = -3 }", "{ period = 2.5 }", "{ period = \"5\" }"] {
            let toml = format!("[[indicators]]\nname = \"rsi\"\nkind = \"rsi\"\nparams = {params}\n");
            assert!(kind_of(&toml).is_err(), "{params} should be rejected");
        }
    }

    #[test]
    fn duplicate_indicator_names_rejected() {
        let result = parse(
            r#"
[[indicators]]
name = "dup"
kind = "sma"
params = { period = 5 }

[[indicators]]
name = "dup"
kind = "ema"
params = { period = 5 }
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_binding_rejected() {
        let result = parse(
            r#"
[input.fields]
close = ""
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_log_format_rejected() {
        let result = parse(
            r#"
[general]
log_format = "xml"
"#,
        );
        assert!(result.is_err());
    }
}
