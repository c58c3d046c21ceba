use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Ejecutable registrado (`uolcao`) al que se ligan las invocaciones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub uuid: Uuid,
    pub label: String,
    /// Ruta del ejecutable en la máquina donde corre el engine.
    pub executable: PathBuf,
}

impl Code {
    pub fn new(label: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self { uuid: Uuid::new_v4(),
               label: label.into(),
               executable: executable.into() }
    }
}
