use thiserror::Error;

use olcao_core::EngineError;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no calculation matches '{0}'")]
    NotFound(String),
    #[error("'{prefix}' is ambiguous ({matches} calculations match)")]
    Ambiguous { prefix: String, matches: usize },
    #[error("a window of {0} days is out of range")]
    TimeWindow(i64),
}

impl From<InfraError> for EngineError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Io(e) => EngineError::Io(e),
            other => EngineError::Internal(other.to_string()),
        }
    }
}
