use thiserror::Error;

/// Errores de validación de parámetros OLCAO.
///
/// Los mensajes son parte del contrato observable: los consumidores (CLI,
/// tests) comparan por subcadena.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("parameters must be a JSON object")]
    NotAnObject,

    #[error("{key} must be a list of 3 integers")]
    KPointsNotList { key: String },

    #[error("{key} must have exactly 3 elements, got {found}")]
    KPointsLength { key: String, found: usize },

    #[error("{key}[{index}] must be a positive integer, got {value}")]
    KPointNotPositive { key: String, index: usize, value: String },

    #[error("Invalid {key} '{value}'. Allowed values: {allowed}")]
    InvalidChoice { key: String, value: String, allowed: String },
}

impl ParameterError {
    /// Reescribe la clave de un `InvalidChoice` (un mismo enum sirve a
    /// `basis_scf` y `basis_pscf`).
    pub(crate) fn for_key(self, key: &str) -> Self {
        match self {
            ParameterError::InvalidChoice { value, allowed, .. } => {
                ParameterError::InvalidChoice { key: key.to_string(), value, allowed }
            }
            other => other,
        }
    }
}
