//! qtype CLI - train a question-type classifier.
//!
//! Reads an annotated question dataset, trains an embedding classifier on it,
//! prints precision / recall / F1 on the training data and saves the model.

mod commands;
mod config;

use clap::Parser;
use config::{CliOverrides, QtypeConfig, TrainSettings};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Train a question-type classifier
///
/// Every option falls back to `qtype.toml` (or the file given with
/// `--config`) and then to its built-in default.
#[derive(Parser, Debug)]
#[command(name = "qtype-cli", author, version, about = "Train a question-type classifier")]
struct Args {
    /// Path to dataset [default: resources/dataset/data.txt]
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Path to GloVe vectors [default: resources/glove/glove.6B.50d.txt]
    #[arg(short, long)]
    glove: Option<PathBuf>,

    /// Embedding dimensions [default: 50]
    #[arg(short = 'n', long)]
    dimensions: Option<usize>,

    /// Path to output directory [default: resources/model]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) [default: info]
    #[arg(short, long)]
    log_level: Option<String>,

    /// Config file (defaults to ./qtype.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_tracing(log_level: &str) {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }
}

fn run(args: Args, config: &QtypeConfig) -> anyhow::Result<()> {
    let overrides = CliOverrides {
        dataset: args.dataset,
        glove: args.glove,
        dimensions: args.dimensions,
        output: args.output,
    };
    let settings = TrainSettings::resolve(overrides, config)?;
    tracing::debug!(?settings, "resolved settings");

    commands::train::execute(&settings)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let file_config = QtypeConfig::discover(args.config.as_deref());

    let log_level = args
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().ok().and_then(|c| c.log_level.clone()))
        .unwrap_or_else(|| config::DEFAULT_LOG_LEVEL.to_string());
    init_tracing(&log_level);

    let result = file_config.map_err(anyhow::Error::from).and_then(|config| run(args, &config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
