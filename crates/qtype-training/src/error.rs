use thiserror::Error;

pub type TrainingResult<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("data ingestion error: {0}")]
    Ingestion(String),

    #[error("model has not been trained yet; call train() first")]
    NotTrained,

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("trainer error: {0}")]
    Trainer(String),

    #[error("artifact error: {0}")]
    Artifact(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
