//! qtype training
//!
//! Backend-agnostic primitives for question-type classification:
//! - Labels, examples and datasets
//! - Tokenizer, reader, classifier and model capabilities
//! - Precision / recall / F1 evaluation over a registered label set
//! - The `Training` run that wires them together
//! - Saved-model artifacts and manifests

pub mod artifacts;
pub mod classifier;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod layout;
pub mod reader;
pub mod tokenizer;
pub mod training;

pub use artifacts::{ArtifactKind, RunId, TrainingArtifact, TrainingManifest};
pub use classifier::{Classifier, Model};
pub use dataset::{Dataset, DatasetId, Example, Label, LabelSet, QUESTION_TYPES};
pub use error::{TrainingError, TrainingResult};
pub use evaluator::{Evaluator, LabelScores, Metrics};
pub use layout::ModelLayout;
pub use reader::{AnnotationReader, Reader};
pub use tokenizer::{Tokenizer, WhitespaceTokenizer};
pub use training::{Training, TrainingState};
