use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Stable identifier for a dataset (content hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(pub String);

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A question-type category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub String);

impl Label {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Coarse question types recognised by default.
pub const QUESTION_TYPES: [&str; 6] = ["ABBR", "DESC", "ENTY", "HUM", "LOC", "NUM"];

/// The fixed universe of labels a run is allowed to see.
///
/// Iteration order is sorted and stable, so per-label vectors (model weights,
/// reports) line up across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Label>", into = "Vec<Label>")]
pub struct LabelSet {
    labels: BTreeSet<Label>,
}

impl LabelSet {
    pub fn new<I, L>(labels: I) -> TrainingResult<Self>
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let mut set = BTreeSet::new();
        for label in labels {
            let label = label.into();
            let trimmed = label.0.trim();
            if trimmed.is_empty() {
                return Err(TrainingError::InvalidConfig("labels must not be blank".to_string()));
            }
            set.insert(Label(trimmed.to_string()));
        }
        if set.is_empty() {
            return Err(TrainingError::InvalidConfig("label set must not be empty".to_string()));
        }
        Ok(Self { labels: set })
    }

    /// The default coarse question types.
    #[must_use]
    pub fn question_types() -> Self {
        Self { labels: QUESTION_TYPES.iter().map(|l| Label::from(*l)).collect() }
    }

    #[must_use]
    pub fn contains(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Position of `label` in iteration order.
    #[must_use]
    pub fn index_of(&self, label: &Label) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.iter().nth(index)
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::question_types()
    }
}

impl TryFrom<Vec<Label>> for LabelSet {
    type Error = TrainingError;

    fn try_from(value: Vec<Label>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LabelSet> for Vec<Label> {
    fn from(value: LabelSet) -> Self {
        value.labels.into_iter().collect()
    }
}

/// A single annotated question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    pub tokens: Vec<String>,
    pub label: Label,
}

/// Ordered, immutable, non-empty collection of labeled examples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Example>", into = "Vec<Example>")]
pub struct Dataset {
    examples: Vec<Example>,
}

impl Dataset {
    pub fn new(examples: Vec<Example>) -> TrainingResult<Self> {
        validate_examples(&examples)?;
        Ok(Self { examples })
    }

    #[must_use]
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Example> {
        self.examples.iter()
    }

    /// Ground-truth labels, positionally aligned with `examples()`.
    #[must_use]
    pub fn target(&self) -> Vec<Label> {
        self.examples.iter().map(|ex| ex.label.clone()).collect()
    }

    pub fn id(&self) -> TrainingResult<DatasetId> {
        compute_dataset_id(&self.examples)
    }
}

impl TryFrom<Vec<Example>> for Dataset {
    type Error = TrainingError;

    fn try_from(value: Vec<Example>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Dataset> for Vec<Example> {
    fn from(value: Dataset) -> Self {
        value.examples
    }
}

pub fn compute_dataset_id(examples: &[Example]) -> TrainingResult<DatasetId> {
    let mut hasher = Sha256::new();

    for ex in examples {
        let bytes = serde_json::to_vec(ex)?;
        hasher.update(bytes);
        hasher.update(b"\n");
    }

    Ok(DatasetId(hex::encode(hasher.finalize())))
}

pub fn validate_examples(examples: &[Example]) -> TrainingResult<()> {
    if examples.is_empty() {
        return Err(TrainingError::Ingestion("dataset must not be empty".to_string()));
    }
    for (idx, ex) in examples.iter().enumerate() {
        if ex.text.trim().is_empty() {
            return Err(TrainingError::Ingestion(format!("example[{idx}] text is empty")));
        }
        if ex.label.0.trim().is_empty() {
            return Err(TrainingError::Ingestion(format!("example[{idx}] label is empty")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(text: &str, label: &str) -> Example {
        Example {
            text: text.to_string(),
            tokens: text.split_whitespace().map(str::to_string).collect(),
            label: Label::from(label),
        }
    }

    #[test]
    fn test_validate_examples_rejects_empty() {
        let examples: Vec<Example> = vec![];
        assert!(matches!(validate_examples(&examples), Err(TrainingError::Ingestion(_))));
    }

    #[test]
    fn test_compute_dataset_id_stable_for_same_content() {
        let examples = vec![example("Who wrote Hamlet ?", "HUM"), example("Where is Rome ?", "LOC")];

        let id1 = compute_dataset_id(&examples).unwrap();
        let id2 = compute_dataset_id(&examples).unwrap();
        assert_eq!(id1, id2);

        let other = compute_dataset_id(&examples[..1]).unwrap();
        assert_ne!(id1, other);
    }

    #[test]
    fn test_target_is_aligned_with_examples() {
        let ds = Dataset::new(vec![
            example("Who wrote Hamlet ?", "HUM"),
            example("Where is Rome ?", "LOC"),
            example("How many legs does a spider have ?", "NUM"),
        ])
        .unwrap();

        let target = ds.target();
        assert_eq!(target.len(), ds.len());
        for (label, ex) in target.iter().zip(ds.iter()) {
            assert_eq!(label, &ex.label);
        }
    }

    #[test]
    fn test_dataset_deserialize_enforces_non_empty() {
        assert!(serde_json::from_str::<Dataset>("[]").is_err());
        assert!(serde_json::from_str::<Dataset>(r#"[{"text":"  ","tokens":[],"label":"HUM"}]"#).is_err());

        let ds = Dataset::new(vec![example("Who wrote Hamlet ?", "HUM")]).unwrap();
        let json = serde_json::to_string(&ds).unwrap();
        assert_eq!(serde_json::from_str::<Dataset>(&json).unwrap(), ds);
    }

    #[test]
    fn test_label_set_rejects_empty_and_blank() {
        assert!(LabelSet::new(Vec::<&str>::new()).is_err());
        assert!(LabelSet::new(["HUM", "  "]).is_err());
    }

    #[test]
    fn test_label_set_is_sorted_and_deduplicated() {
        let set = LabelSet::new(["LOC", "HUM", "LOC"]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.index_of(&Label::from("HUM")), Some(0));
        assert_eq!(set.get(1), Some(&Label::from("LOC")));
    }

    #[test]
    fn test_label_set_deserialize_enforces_non_empty() {
        let err = serde_json::from_str::<LabelSet>("[]");
        assert!(err.is_err());

        let set: LabelSet = serde_json::from_str(r#"["NUM","ABBR"]"#).unwrap();
        assert!(set.contains(&Label::from("ABBR")));
    }
}
