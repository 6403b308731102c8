//! Word vectors in GloVe text format.

use qtype_training::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lowercased word → fixed-width vector table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embeddings {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl Embeddings {
    /// Load `word v1 .. vN` rows from `path`, where N must equal `dimensions`.
    pub fn load(path: &Path, dimensions: usize) -> TrainingResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            TrainingError::Ingestion(format!("failed to open embeddings {}: {e}", path.display()))
        })?;

        let mut table = Self::empty(dimensions)?;
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                TrainingError::Ingestion(format!("{}: line {}: {e}", path.display(), idx + 1))
            })?;
            table.push_row(&line, idx + 1).map_err(|e| match e {
                TrainingError::Ingestion(msg) => {
                    TrainingError::Ingestion(format!("{}: {msg}", path.display()))
                }
                other => other,
            })?;
        }

        tracing::info!(path = %path.display(), words = table.len(), dimensions, "Loaded embeddings");
        Ok(table)
    }

    /// Parse rows already held in memory.
    pub fn parse_str(contents: &str, dimensions: usize) -> TrainingResult<Self> {
        let mut table = Self::empty(dimensions)?;
        for (idx, line) in contents.lines().enumerate() {
            table.push_row(line, idx + 1)?;
        }
        Ok(table)
    }

    fn empty(dimensions: usize) -> TrainingResult<Self> {
        if dimensions == 0 {
            return Err(TrainingError::InvalidConfig("embedding dimensions must be >= 1".to_string()));
        }
        Ok(Self { dimensions, vectors: HashMap::new() })
    }

    fn push_row(&mut self, line: &str, line_no: usize) -> TrainingResult<()> {
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            return Ok(());
        };

        let mut vector = Vec::with_capacity(self.dimensions);
        for field in fields {
            let value: f32 = field.parse().map_err(|_| {
                TrainingError::Ingestion(format!("line {line_no}: invalid number '{field}'"))
            })?;
            if !value.is_finite() {
                return Err(TrainingError::Ingestion(format!("line {line_no}: non-finite value '{field}'")));
            }
            vector.push(value);
        }

        if vector.len() != self.dimensions {
            return Err(TrainingError::Ingestion(format!(
                "line {line_no}: '{word}' has {} values, expected {}",
                vector.len(),
                self.dimensions
            )));
        }

        // First occurrence wins.
        self.vectors.entry(word.to_lowercase()).or_insert(vector);
        Ok(())
    }

    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[must_use]
    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(&token.to_lowercase()).map(Vec::as_slice)
    }

    /// Mean of the known token vectors; all zeros when no token is known.
    #[must_use]
    pub fn mean_vector(&self, tokens: &[String]) -> Vec<f64> {
        let mut sum = vec![0.0f64; self.dimensions];
        let mut known = 0usize;
        for vector in tokens.iter().filter_map(|t| self.get(t)) {
            for (acc, v) in sum.iter_mut().zip(vector) {
                *acc += f64::from(*v);
            }
            known += 1;
        }
        if known > 0 {
            #[allow(clippy::cast_precision_loss)]
            let n = known as f64;
            for acc in &mut sum {
                *acc /= n;
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GLOVE: &str = "the 0.1 0.2 0.3\nwho 1.0 0.0 -1.0\nWhere 0.0 1.0 0.5\n\n";

    #[test]
    fn test_parse_rows_and_lowercase_lookup() {
        let emb = Embeddings::parse_str(GLOVE, 3).unwrap();
        assert_eq!(emb.len(), 3);
        assert_eq!(emb.get("WHO"), Some(&[1.0, 0.0, -1.0][..]));
        assert_eq!(emb.get("where"), Some(&[0.0, 1.0, 0.5][..]));
        assert!(emb.get("missing").is_none());
    }

    #[test]
    fn test_wrong_width_reports_line() {
        let err = Embeddings::parse_str("a 1 2 3\nb 1 2\n", 3).unwrap_err();
        assert!(matches!(&err, TrainingError::Ingestion(msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        assert!(Embeddings::parse_str("a 1 x 3\n", 3).is_err());
        assert!(Embeddings::parse_str("a 1 NaN 3\n", 3).is_err());
    }

    #[test]
    fn test_zero_dimensions_is_invalid() {
        assert!(matches!(Embeddings::parse_str("", 0), Err(TrainingError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_missing_file_is_ingestion_error() {
        let temp = TempDir::new().unwrap();
        let err = Embeddings::load(&temp.path().join("glove.txt"), 50).unwrap_err();
        assert!(matches!(err, TrainingError::Ingestion(_)));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("glove.txt");
        std::fs::write(&path, GLOVE).unwrap();

        let emb = Embeddings::load(&path, 3).unwrap();
        assert_eq!(emb.dimensions(), 3);
        assert_eq!(emb.len(), 3);
    }

    #[test]
    fn test_mean_vector_ignores_unknown_tokens() {
        let emb = Embeddings::parse_str(GLOVE, 3).unwrap();
        let tokens: Vec<String> = ["Who", "zzz", "where"].iter().map(|s| s.to_string()).collect();

        let mean = emb.mean_vector(&tokens);
        assert_eq!(mean, vec![0.5, 0.5, -0.25]);

        let none = emb.mean_vector(&["zzz".to_string()]);
        assert_eq!(none, vec![0.0, 0.0, 0.0]);
    }
}
