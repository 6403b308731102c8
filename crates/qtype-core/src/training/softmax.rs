use crate::embeddings::Embeddings;
use qtype_training::artifacts::{make_artifact, write_json};
use qtype_training::{
    ArtifactKind, Classifier, Dataset, Label, LabelSet, Model, ModelLayout, TrainingArtifact,
    TrainingError, TrainingResult,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxHyperParams {
    pub epochs: u32,
    pub learning_rate: f64,
    pub l2: f64,
}

impl Default for SoftmaxHyperParams {
    fn default() -> Self {
        Self { epochs: 200, learning_rate: 0.5, l2: 1e-4 }
    }
}

impl SoftmaxHyperParams {
    pub fn validate(&self) -> TrainingResult<()> {
        if self.epochs == 0 {
            return Err(TrainingError::InvalidConfig("epochs must be >= 1".to_string()));
        }
        if !(self.learning_rate.is_finite()) || self.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidConfig("learning_rate must be > 0".to_string()));
        }
        if !(self.l2.is_finite()) || self.l2 < 0.0 {
            return Err(TrainingError::InvalidConfig("l2 must be >= 0".to_string()));
        }
        Ok(())
    }
}

/// Multinomial logistic regression over averaged word vectors.
///
/// Each question is represented by the mean embedding of its known tokens.
/// Weights start at zero and are fitted with full-batch gradient descent, so
/// training the same data twice yields the same model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingClassifier {
    embeddings: Embeddings,
    labels: LabelSet,
    hyperparams: SoftmaxHyperParams,
}

impl EmbeddingClassifier {
    #[must_use]
    pub fn new(embeddings: Embeddings, labels: LabelSet) -> Self {
        Self { embeddings, labels, hyperparams: SoftmaxHyperParams::default() }
    }

    /// Load GloVe vectors from `glove_path` and build a classifier over `labels`.
    pub fn load(glove_path: &Path, dimensions: usize, labels: LabelSet) -> TrainingResult<Self> {
        let embeddings = Embeddings::load(glove_path, dimensions)?;
        Ok(Self::new(embeddings, labels))
    }

    pub fn with_hyperparams(mut self, hyperparams: SoftmaxHyperParams) -> TrainingResult<Self> {
        hyperparams.validate()?;
        self.hyperparams = hyperparams;
        Ok(self)
    }

    #[must_use]
    pub fn hyperparams(&self) -> &SoftmaxHyperParams {
        &self.hyperparams
    }

    #[must_use]
    pub fn embeddings(&self) -> &Embeddings {
        &self.embeddings
    }

    fn features(&self, dataset: &Dataset) -> Vec<Vec<f64>> {
        dataset.iter().map(|ex| self.embeddings.mean_vector(&ex.tokens)).collect()
    }
}

/// Trained weights, one row per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxModel {
    pub labels: Vec<Label>,
    pub dimensions: usize,
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl SoftmaxModel {
    fn zeros(labels: Vec<Label>, dimensions: usize) -> Self {
        let k = labels.len();
        Self { labels, dimensions, weights: vec![vec![0.0; dimensions]; k], bias: vec![0.0; k] }
    }

    pub fn load(path: &Path) -> TrainingResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Class probabilities for one feature vector.
    #[must_use]
    pub fn probabilities(&self, features: &[f64]) -> Vec<f64> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| w.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();
        softmax(&logits)
    }

    fn argmax(&self, features: &[f64]) -> Option<&Label> {
        let probs = self.probabilities(features);
        probs
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .and_then(|(idx, _)| self.labels.get(idx))
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl Model for SoftmaxModel {
    fn save(&self, output_dir: &Path) -> TrainingResult<Vec<TrainingArtifact>> {
        let layout = ModelLayout::new(output_dir);
        layout.ensure_dirs()?;

        let model_path = layout.model_path();
        write_json(&model_path, self)?;
        Ok(vec![make_artifact(ArtifactKind::Model, model_path)?])
    }
}

impl Classifier for EmbeddingClassifier {
    type Model = SoftmaxModel;

    fn id(&self) -> &'static str {
        "embedding-softmax"
    }

    #[allow(clippy::cast_precision_loss)]
    fn train(&self, dataset: &Dataset) -> TrainingResult<SoftmaxModel> {
        self.hyperparams.validate()?;
        if dataset.is_empty() {
            return Err(TrainingError::Trainer("cannot train on an empty dataset".to_string()));
        }

        let targets = dataset
            .iter()
            .enumerate()
            .map(|(idx, ex)| {
                self.labels.index_of(&ex.label).ok_or_else(|| {
                    TrainingError::Trainer(format!("example[{idx}] label '{}' is not registered", ex.label))
                })
            })
            .collect::<TrainingResult<Vec<usize>>>()?;
        let features = self.features(dataset);

        let dims = self.embeddings.dimensions();
        let mut model = SoftmaxModel::zeros(self.labels.iter().cloned().collect(), dims);
        let k = model.labels.len();
        let n = features.len() as f64;
        let lr = self.hyperparams.learning_rate;
        let l2 = self.hyperparams.l2;

        for epoch in 1..=self.hyperparams.epochs {
            let mut grad_w = vec![vec![0.0f64; dims]; k];
            let mut grad_b = vec![0.0f64; k];
            let mut loss = 0.0f64;

            for (x, &y) in features.iter().zip(&targets) {
                let probs = model.probabilities(x);
                loss -= probs[y].max(f64::MIN_POSITIVE).ln();
                for (class, p) in probs.iter().enumerate() {
                    let err = p - if class == y { 1.0 } else { 0.0 };
                    grad_b[class] += err;
                    for (g, xi) in grad_w[class].iter_mut().zip(x) {
                        *g += err * xi;
                    }
                }
            }

            for class in 0..k {
                for (w, g) in model.weights[class].iter_mut().zip(&grad_w[class]) {
                    *w -= lr * (g / n + l2 * *w);
                }
                model.bias[class] -= lr * grad_b[class] / n;
            }

            if epoch == 1 || epoch % 50 == 0 || epoch == self.hyperparams.epochs {
                tracing::debug!(epoch, loss = loss / n, "softmax epoch");
            }
        }

        Ok(model)
    }

    fn predict(&self, dataset: &Dataset, model: &SoftmaxModel) -> TrainingResult<Vec<Label>> {
        if model.dimensions != self.embeddings.dimensions() {
            return Err(TrainingError::Trainer(format!(
                "model expects {}-dimensional features, embeddings have {}",
                model.dimensions,
                self.embeddings.dimensions()
            )));
        }

        self.features(dataset)
            .iter()
            .map(|x| {
                model
                    .argmax(x)
                    .cloned()
                    .ok_or_else(|| TrainingError::Trainer("model has no labels".to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtype_training::{AnnotationReader, Evaluator, Training, TrainingState, WhitespaceTokenizer};
    use tempfile::TempDir;

    const GLOVE: &str = "\
who 1.0 0.0 0.0
where 0.0 1.0 0.0
how 0.0 0.0 1.0
many 0.0 0.2 0.8
";

    const DATA: &str = "\
HUM:ind Who wrote Hamlet ?
HUM:ind Who painted the Mona Lisa ?
LOC:city Where is the Eiffel Tower ?
LOC:country Where is Timbuktu ?
NUM:count How many moons does Mars have ?
";

    fn labels() -> LabelSet {
        LabelSet::new(["HUM", "LOC", "NUM"]).unwrap()
    }

    fn classifier() -> EmbeddingClassifier {
        EmbeddingClassifier::new(Embeddings::parse_str(GLOVE, 3).unwrap(), labels())
    }

    fn dataset() -> Dataset {
        AnnotationReader::new(labels()).parse_str(DATA, &WhitespaceTokenizer).unwrap()
    }

    #[test]
    fn test_hyperparams_validate() {
        assert!(SoftmaxHyperParams::default().validate().is_ok());
        assert!(SoftmaxHyperParams { epochs: 0, ..Default::default() }.validate().is_err());
        assert!(SoftmaxHyperParams { learning_rate: f64::NAN, ..Default::default() }.validate().is_err());
        assert!(SoftmaxHyperParams { l2: -1.0, ..Default::default() }.validate().is_err());
        assert!(classifier().with_hyperparams(SoftmaxHyperParams { epochs: 0, ..Default::default() }).is_err());
    }

    #[test]
    fn test_train_fits_separable_data() {
        let clf = classifier();
        let ds = dataset();

        let model = clf.train(&ds).unwrap();
        assert_eq!(model.weights.len(), 3);
        assert_eq!(clf.predict(&ds, &model).unwrap(), ds.target());
    }

    #[test]
    fn test_training_is_deterministic() {
        let clf = classifier();
        let ds = dataset();
        assert_eq!(clf.train(&ds).unwrap(), clf.train(&ds).unwrap());
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = classifier().train(&dataset()).unwrap();
        let total: f64 = model.probabilities(&[0.3, 0.3, 0.4]).iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_train_rejects_unregistered_label() {
        let clf = EmbeddingClassifier::new(Embeddings::parse_str(GLOVE, 3).unwrap(), LabelSet::new(["HUM"]).unwrap());
        assert!(matches!(clf.train(&dataset()), Err(TrainingError::Trainer(_))));
    }

    #[test]
    fn test_snapshot_with_empty_dataset_is_rejected() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data.txt");
        std::fs::write(&data, DATA).unwrap();

        let training = Training::with_reader(&data, classifier(), AnnotationReader::new(labels())).unwrap();
        let mut state = serde_json::to_value(training.snapshot()).unwrap();
        state["dataset"] = serde_json::json!([]);

        let restored =
            serde_json::from_value::<TrainingState<EmbeddingClassifier, AnnotationReader, WhitespaceTokenizer>>(state);
        assert!(restored.is_err());
    }

    #[test]
    fn test_predict_rejects_dimension_mismatch() {
        let model = classifier().train(&dataset()).unwrap();
        let other = EmbeddingClassifier::new(Embeddings::parse_str("who 1 0\n", 2).unwrap(), labels());
        assert!(other.predict(&dataset(), &model).is_err());
    }

    #[test]
    fn test_save_writes_loadable_model() {
        let temp = TempDir::new().unwrap();
        let model = classifier().train(&dataset()).unwrap();

        let artifacts = model.save(&temp.path().join("model")).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].kind, ArtifactKind::Model);

        let loaded = SoftmaxModel::load(&artifacts[0].path).unwrap();
        assert_eq!(loaded.labels, model.labels);
        assert_eq!(loaded.dimensions, 3);
    }

    #[test]
    fn test_full_training_run_and_snapshot() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data.txt");
        std::fs::write(&data, DATA).unwrap();

        let reader = AnnotationReader::new(labels());
        let mut training = Training::with_reader(&data, classifier(), reader).unwrap();
        let evaluator = Evaluator::new(labels());

        let json = serde_json::to_string(&training.snapshot()).unwrap();

        training.train().unwrap();
        let metrics = training.training_error(&evaluator).unwrap();
        assert!((metrics.f1_score - 1.0).abs() < 1e-9);

        let state: TrainingState<EmbeddingClassifier, AnnotationReader, WhitespaceTokenizer> =
            serde_json::from_str(&json).unwrap();
        let mut restored = Training::from_state(state);
        assert_eq!(restored.train().unwrap(), training.model().unwrap());
        assert_eq!(restored.training_error(&evaluator).unwrap(), metrics);
    }
}
