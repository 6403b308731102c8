//! End-to-end training run: read, train, score, save.

use crate::artifacts::TrainingArtifact;
use crate::classifier::{Classifier, Model};
use crate::dataset::Dataset;
use crate::error::{TrainingError, TrainingResult};
use crate::evaluator::{Evaluator, Metrics};
use crate::reader::{AnnotationReader, Reader};
use crate::tokenizer::{Tokenizer, WhitespaceTokenizer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Owns the dataset and trained model for one training run.
///
/// The dataset is read eagerly when the run is constructed, so a bad data
/// source fails before any training starts.
pub struct Training<C: Classifier, R = AnnotationReader, T = WhitespaceTokenizer> {
    data_path: PathBuf,
    classifier: C,
    reader: R,
    tokenizer: T,
    dataset: Dataset,
    model: Option<C::Model>,
}

impl<C: Classifier> Training<C> {
    /// Read `data_path` with the default annotation reader and whitespace tokenizer.
    pub fn new(data_path: impl Into<PathBuf>, classifier: C) -> TrainingResult<Self> {
        Self::with_components(data_path, classifier, AnnotationReader::default(), WhitespaceTokenizer)
    }

    pub fn with_tokenizer<T: Tokenizer>(
        data_path: impl Into<PathBuf>,
        classifier: C,
        tokenizer: T,
    ) -> TrainingResult<Training<C, AnnotationReader, T>> {
        Training::with_components(data_path, classifier, AnnotationReader::default(), tokenizer)
    }

    pub fn with_reader<R: Reader>(
        data_path: impl Into<PathBuf>,
        classifier: C,
        reader: R,
    ) -> TrainingResult<Training<C, R, WhitespaceTokenizer>> {
        Training::with_components(data_path, classifier, reader, WhitespaceTokenizer)
    }
}

impl<C, R, T> Training<C, R, T>
where
    C: Classifier,
    R: Reader,
    T: Tokenizer,
{
    pub fn with_components(
        data_path: impl Into<PathBuf>,
        classifier: C,
        reader: R,
        tokenizer: T,
    ) -> TrainingResult<Self> {
        let data_path = data_path.into();
        let dataset = reader.parse(&data_path, &tokenizer)?;
        tracing::info!(path = %data_path.display(), examples = dataset.len(), "Loaded dataset");

        Ok(Self { data_path, classifier, reader, tokenizer, dataset, model: None })
    }
}

impl<C: Classifier, R, T> Training<C, R, T> {
    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    #[must_use]
    pub fn reader(&self) -> &R {
        &self.reader
    }

    #[must_use]
    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// The trained model, once `train()` has completed.
    pub fn model(&self) -> TrainingResult<&C::Model> {
        self.model.as_ref().ok_or(TrainingError::NotTrained)
    }

    /// Train on the full dataset and keep the resulting model.
    pub fn train(&mut self) -> TrainingResult<&C::Model> {
        tracing::info!(classifier = self.classifier.id(), "Training model with the full dataset");
        let model = self.classifier.train(&self.dataset)?;
        Ok(&*self.model.insert(model))
    }

    /// Score the trained model against the data it was trained on.
    ///
    /// This measures training-set fit, not generalization.
    pub fn training_error(&self, evaluator: &Evaluator) -> TrainingResult<Metrics> {
        let model = self.model()?;
        let y_true = self.dataset.target();
        let y_pred = self.classifier.predict(&self.dataset, model)?;

        let metrics = evaluator.evaluate(&y_true, &y_pred)?;
        tracing::info!(
            precision = metrics.precision,
            recall = metrics.recall,
            f1_score = metrics.f1_score,
            "Computed training error"
        );
        Ok(metrics)
    }

    /// Persist `model` through its own save implementation.
    pub fn save(&self, model: &C::Model, output_dir: &Path) -> TrainingResult<Vec<TrainingArtifact>> {
        tracing::info!(output = %output_dir.display(), "Saving model");
        model.save(output_dir)
    }

    /// Decompose the run into a serializable state.
    #[must_use]
    pub fn into_state(self) -> TrainingState<C, R, T> {
        TrainingState {
            data_path: self.data_path,
            classifier: self.classifier,
            reader: self.reader,
            tokenizer: self.tokenizer,
            dataset: self.dataset,
            model: self.model,
        }
    }

    /// Rebuild a run from a captured state without re-reading the data source.
    #[must_use]
    pub fn from_state(state: TrainingState<C, R, T>) -> Self {
        Self {
            data_path: state.data_path,
            classifier: state.classifier,
            reader: state.reader,
            tokenizer: state.tokenizer,
            dataset: state.dataset,
            model: state.model,
        }
    }
}

impl<C, R, T> Training<C, R, T>
where
    C: Classifier + Clone,
    C::Model: Clone,
    R: Clone,
    T: Clone,
{
    /// Capture the full run state, leaving `self` untouched.
    #[must_use]
    pub fn snapshot(&self) -> TrainingState<C, R, T> {
        TrainingState {
            data_path: self.data_path.clone(),
            classifier: self.classifier.clone(),
            reader: self.reader.clone(),
            tokenizer: self.tokenizer.clone(),
            dataset: self.dataset.clone(),
            model: self.model.clone(),
        }
    }
}

/// Everything a [`Training`] run holds, in serializable form.
#[derive(Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize, C::Model: Serialize, R: Serialize, T: Serialize",
    deserialize = "C: Deserialize<'de>, C::Model: Deserialize<'de>, R: Deserialize<'de>, T: Deserialize<'de>"
))]
pub struct TrainingState<C: Classifier, R, T> {
    pub data_path: PathBuf,
    pub classifier: C,
    pub reader: R,
    pub tokenizer: T,
    pub dataset: Dataset,
    pub model: Option<C::Model>,
}
