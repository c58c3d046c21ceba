//! Errores del core.

use olcao_domain::ParameterError;
use thiserror::Error;

use crate::exit_code::WorkflowExitCode;
use crate::registry::CapabilityKind;

/// Errores al preparar una calculación para su envío.
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ParameterError),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("sandbox io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errores del engine externo (envío, espera, estado).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("submission rejected: {0}")]
    Submission(String),
    #[error("unknown calculation {0}")]
    UnknownCalculation(uuid::Uuid),
    #[error(transparent)]
    Prepare(#[from] CalcError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("engine io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unregistered capability {kind}:{name}")]
    Unregistered { kind: CapabilityKind, name: String },
    #[error("capability {kind}:{name} registered twice")]
    Duplicate { kind: CapabilityKind, name: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("plugin context is closed")]
    Closed,
}

/// Resultado terminal no exitoso de un workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Terminación temprana con exit code tipado.
    #[error("[{status}] {0}", status = .0.status())]
    Exit(WorkflowExitCode),
    #[error("invalid workflow inputs: {0}")]
    InvalidInputs(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl From<WorkflowExitCode> for WorkflowError {
    fn from(code: WorkflowExitCode) -> Self {
        WorkflowError::Exit(code)
    }
}

impl WorkflowError {
    pub fn exit_code(&self) -> Option<&WorkflowExitCode> {
        match self {
            WorkflowError::Exit(code) => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_error_shows_status_and_message() {
        let err = WorkflowError::from(WorkflowExitCode::ScfNotConverged);
        assert_eq!(err.to_string(), "[402] SCF calculation did not converge.");
        assert_eq!(err.exit_code().map(WorkflowExitCode::status), Some(402));
    }
}
