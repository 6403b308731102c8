use crate::artifacts::TrainingArtifact;
use crate::dataset::{Dataset, Label};
use crate::error::TrainingResult;
use std::path::Path;

/// A trained artifact that knows how to persist itself.
pub trait Model {
    /// Write the model into `output_dir`, returning what was written.
    fn save(&self, output_dir: &Path) -> TrainingResult<Vec<TrainingArtifact>>;
}

/// Training backend for question-type classification.
///
/// Implementations are synchronous; training is a single blocking call.
pub trait Classifier {
    type Model: Model;

    fn id(&self) -> &'static str;

    fn train(&self, dataset: &Dataset) -> TrainingResult<Self::Model>;

    /// Predicted labels, positionally aligned with `dataset.examples()`.
    fn predict(&self, dataset: &Dataset, model: &Self::Model) -> TrainingResult<Vec<Label>>;
}
