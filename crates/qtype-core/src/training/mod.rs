//! Training backends.
//!
//! The backend-agnostic types live in `qtype-training`. This module contains
//! the concrete classifier used by the qtype binary.

pub mod softmax;

pub use softmax::{EmbeddingClassifier, SoftmaxHyperParams, SoftmaxModel};
