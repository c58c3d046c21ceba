use serde::{Deserialize, Serialize};
use std::path::Path;

/// Archivo único de entrada (input OLCAO o esqueleto `.skl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinglefileData {
    pub filename: String,
    pub content: String,
}

impl SinglefileData {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self { filename: filename.into(),
               content: content.into() }
    }

    /// Lee el archivo del disco; el nombre es el componente final de la ruta.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let filename = path.file_name()
                           .map(|n| n.to_string_lossy().into_owned())
                           .unwrap_or_else(|| "input".to_string());
        Ok(Self { filename, content })
    }
}
