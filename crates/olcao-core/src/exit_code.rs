//! Taxonomía de exit codes expuesta al host.
//!
//! - 3xx: calculación individual (lo decide el parser).
//! - 4xx: workflow base.
//!
//! Cada variante tiene `status()` numérico estable y `label()` simbólico.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::EXIT_STATUS_NOT_CONVERGED;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalcExitCode {
    #[error("The retrieved folder data node could not be accessed.")]
    NoRetrievedFolder,
    #[error("The expected OLCAO output file was not found.")]
    MissingOutputFile,
    #[error("The SCF calculation did not converge.")]
    NotConverged,
    #[error("The OLCAO calculation reported an error.")]
    ScfFailed,
    #[error("makeinput failed: no OLCAO inputs were generated.")]
    MakeinputFailed,
}

impl CalcExitCode {
    pub fn status(&self) -> u32 {
        match self {
            CalcExitCode::NoRetrievedFolder => 300,
            CalcExitCode::MissingOutputFile => 301,
            CalcExitCode::NotConverged => EXIT_STATUS_NOT_CONVERGED,
            CalcExitCode::ScfFailed => 303,
            CalcExitCode::MakeinputFailed => 304,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CalcExitCode::NoRetrievedFolder => "ERROR_NO_RETRIEVED_FOLDER",
            CalcExitCode::MissingOutputFile => "ERROR_MISSING_OUTPUT_FILE",
            CalcExitCode::NotConverged => "ERROR_NOT_CONVERGED",
            CalcExitCode::ScfFailed => "ERROR_SCF_FAILED",
            CalcExitCode::MakeinputFailed => "ERROR_MAKEINPUT_FAILED",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowExitCode {
    #[error("Invalid calculation type requested: {calc_type}")]
    InvalidCalculationType { calc_type: String },
    #[error("SCF calculation did not converge.")]
    ScfNotConverged,
    #[error("SCF calculation failed with exit code {exit_status}.")]
    ScfFailed { exit_status: String },
    #[error("Post-SCF calculation '{calc_type}' failed with exit code {exit_status}.")]
    PostScfFailed { calc_type: String, exit_status: String },
}

impl WorkflowExitCode {
    pub fn status(&self) -> u32 {
        match self {
            WorkflowExitCode::InvalidCalculationType { .. } => 401,
            WorkflowExitCode::ScfNotConverged => 402,
            WorkflowExitCode::ScfFailed { .. } => 403,
            WorkflowExitCode::PostScfFailed { .. } => 404,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowExitCode::InvalidCalculationType { .. } => "ERROR_INVALID_CALCULATION_TYPE",
            WorkflowExitCode::ScfNotConverged => "ERROR_SCF_NOT_CONVERGED",
            WorkflowExitCode::ScfFailed { .. } => "ERROR_SCF_FAILED",
            WorkflowExitCode::PostScfFailed { .. } => "ERROR_POST_SCF_FAILED",
        }
    }
}

/// Representación textual de un exit status opcional (`None` se muestra como
/// `None`, igual que lo reporta el host cuando el proceso fue excepcionado).
pub fn format_exit_status(status: Option<u32>) -> String {
    status.map(|s| s.to_string()).unwrap_or_else(|| "None".to_string())
}
