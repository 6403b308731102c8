use crate::dataset::{Dataset, Example, Label, LabelSet};
use crate::error::{TrainingError, TrainingResult};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Turns a data source into a [`Dataset`].
pub trait Reader {
    fn parse(&self, data_path: &Path, tokenizer: &dyn Tokenizer) -> TrainingResult<Dataset>;
}

/// Reads line-oriented question annotations.
///
/// Each non-blank line is `LABEL question text`. Fine-grained labels such as
/// `HUM:ind` are folded to their coarse part. Lines starting with `#` are
/// comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationReader {
    labels: LabelSet,
}

impl AnnotationReader {
    #[must_use]
    pub fn new(labels: LabelSet) -> Self {
        Self { labels }
    }

    #[must_use]
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Parse annotation text already loaded into memory.
    pub fn parse_str(&self, contents: &str, tokenizer: &dyn Tokenizer) -> TrainingResult<Dataset> {
        let mut examples = Vec::new();

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (raw_label, text) = match line.split_once(char::is_whitespace) {
                Some((label, text)) => (label, text.trim()),
                None => (line, ""),
            };
            if text.is_empty() {
                return Err(TrainingError::Ingestion(format!(
                    "line {}: annotation has a label but no question text",
                    idx + 1
                )));
            }

            let coarse = raw_label.split(':').next().unwrap_or(raw_label);
            let label = Label::from(coarse);
            if !self.labels.contains(&label) {
                return Err(TrainingError::Ingestion(format!(
                    "line {}: unknown question type '{raw_label}'",
                    idx + 1
                )));
            }

            examples.push(Example {
                text: text.to_string(),
                tokens: tokenizer.tokenize(text),
                label,
            });
        }

        if examples.is_empty() {
            return Err(TrainingError::Ingestion("no annotated examples found".to_string()));
        }

        Dataset::new(examples)
    }
}

impl Reader for AnnotationReader {
    fn parse(&self, data_path: &Path, tokenizer: &dyn Tokenizer) -> TrainingResult<Dataset> {
        let contents = std::fs::read_to_string(data_path).map_err(|e| {
            TrainingError::Ingestion(format!("failed to read {}: {e}", data_path.display()))
        })?;

        let dataset = self
            .parse_str(&contents, tokenizer)
            .map_err(|e| match e {
                TrainingError::Ingestion(msg) => {
                    TrainingError::Ingestion(format!("{}: {msg}", data_path.display()))
                }
                other => other,
            })?;

        tracing::debug!(path = %data_path.display(), examples = dataset.len(), "parsed annotations");
        Ok(dataset)
    }
}
