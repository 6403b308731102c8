//! qtype core - concrete backends for question-type classification.
//!
//! The backend-agnostic types live in `qtype-training`. This crate provides
//! the embedding table and the classifier used by the `qtype-cli` binary.

pub mod embeddings;
pub mod training;

pub use embeddings::Embeddings;
pub use training::{EmbeddingClassifier, SoftmaxHyperParams, SoftmaxModel};
