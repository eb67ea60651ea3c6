use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chart_indicators::config::{self, AppConfig};
use chart_indicators::error::InputError;
use chart_indicators::notifier::terminal::TerminalNotifier;
use chart_indicators::output::IndicatorResult;
use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("input error")]
    Input,
    #[display("runtime error")]
    Runtime,
    #[display("output error")]
    Output,
}

#[derive(Parser)]
#[command(name = "chart-indicators", about = "Compute technical indicators over OHLCV records")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "indicators.toml")]
    config: PathBuf,
    /// JSON array of records; overrides `input.path`
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Log every line's value at this sample index
    #[arg(long)]
    at: Option<usize>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(&cli.config).change_context(AppError::Config)?;

    init_tracing(&config);

    let Some(input) = cli.input.as_ref().or(config.input.path.as_ref()) else {
        return Err(Report::new(AppError::Input)
            .attach("no input path: pass --input or set input.path"));
    };
    let records = Arc::new(read_records(input).change_context(AppError::Input)?);
    info!(
        input = %input.display(),
        records = records.len(),
        indicators = config.indicators.len(),
        "records loaded"
    );

    // One blocking task per indicator; each recomputes independently.
    let bindings = config.input.bindings();
    let mut handles = Vec::with_capacity(config.indicators.len());
    for entry in &config.indicators {
        let mut technical =
            config::build_technical(entry, &bindings).change_context(AppError::Config)?;
        if let Some(index) = cli.at {
            technical.subscribe(Arc::new(TerminalNotifier::at(index)));
        }

        let records = Arc::clone(&records);
        handles.push(tokio::task::spawn_blocking(move || {
            let result = technical.refresh(records.as_slice()).clone();
            (technical.label().to_string(), result)
        }));
    }

    let mut results: BTreeMap<String, IndicatorResult> = BTreeMap::new();
    for handle in handles {
        let (label, result) = handle.await.change_context(AppError::Runtime)?;
        if result.is_empty() {
            tracing::warn!(indicator = %label, "indicator produced no lines");
        }
        results.insert(label, result);
    }

    let output = if cli.pretty {
        serde_json::to_string_pretty(&results)
    } else {
        serde_json::to_string(&results)
    }
    .change_context(AppError::Output)?;
    println!("{output}");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn read_records(path: &Path) -> Result<Vec<Value>, Report<InputError>> {
    let content = std::fs::read_to_string(path)
        .change_context(InputError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    serde_json::from_str(&content).change_context(InputError::Parse {
        reason: "expected a JSON array of objects".into(),
    })
}
