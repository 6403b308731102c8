//! CLI configuration loading and merging.
//!
//! Precedence, highest first:
//! 1. CLI arguments
//! 2. Config file (`--config <path>`, or `./qtype.toml` when present)
//! 3. Built-in defaults

use anyhow::Result;
use qtype_core::SoftmaxHyperParams;
use qtype_training::LabelSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_DATASET: &str = "resources/dataset/data.txt";
pub const DEFAULT_GLOVE: &str = "resources/glove/glove.6B.50d.txt";
pub const DEFAULT_DIMENSIONS: usize = 50;
pub const DEFAULT_OUTPUT: &str = "resources/model";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of a `qtype.toml` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QtypeConfig {
    #[serde(default)]
    pub dataset: Option<PathBuf>,

    #[serde(default)]
    pub glove: Option<PathBuf>,

    #[serde(default)]
    pub dimensions: Option<usize>,

    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub log_level: Option<String>,

    /// Overrides the default question types.
    #[serde(default)]
    pub labels: Option<Vec<String>>,

    #[serde(default)]
    pub hyperparams: HyperParamsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HyperParamsConfig {
    #[serde(default)]
    pub epochs: Option<u32>,

    #[serde(default)]
    pub learning_rate: Option<f64>,

    #[serde(default)]
    pub l2: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),
}

impl QtypeConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    pub fn default_local_path() -> PathBuf {
        PathBuf::from("qtype.toml")
    }

    /// Load `explicit` if given (it must exist), else `./qtype.toml` if present.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let local = Self::default_local_path();
        if local.exists() {
            return Self::load_from_file(&local);
        }
        Ok(Self::default())
    }
}

/// Fully resolved inputs for one training run.
#[derive(Debug, Clone)]
pub struct TrainSettings {
    pub dataset: PathBuf,
    pub glove: PathBuf,
    pub dimensions: usize,
    pub output: PathBuf,
    pub labels: LabelSet,
    pub hyperparams: SoftmaxHyperParams,
}

/// Flag values as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dataset: Option<PathBuf>,
    pub glove: Option<PathBuf>,
    pub dimensions: Option<usize>,
    pub output: Option<PathBuf>,
}

impl TrainSettings {
    pub fn resolve(cli: CliOverrides, config: &QtypeConfig) -> Result<Self> {
        let labels = match &config.labels {
            Some(labels) => LabelSet::new(labels.iter().map(String::as_str))?,
            None => LabelSet::question_types(),
        };

        let defaults = SoftmaxHyperParams::default();
        let hyperparams = SoftmaxHyperParams {
            epochs: config.hyperparams.epochs.unwrap_or(defaults.epochs),
            learning_rate: config.hyperparams.learning_rate.unwrap_or(defaults.learning_rate),
            l2: config.hyperparams.l2.unwrap_or(defaults.l2),
        };
        hyperparams.validate()?;

        Ok(Self {
            dataset: cli.dataset.or_else(|| config.dataset.clone()).unwrap_or_else(|| DEFAULT_DATASET.into()),
            glove: cli.glove.or_else(|| config.glove.clone()).unwrap_or_else(|| DEFAULT_GLOVE.into()),
            dimensions: cli.dimensions.or(config.dimensions).unwrap_or(DEFAULT_DIMENSIONS),
            output: cli.output.or_else(|| config.output.clone()).unwrap_or_else(|| DEFAULT_OUTPUT.into()),
            labels,
            hyperparams,
        })
    }
}
