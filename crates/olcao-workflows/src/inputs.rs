//! Entradas del workchain base.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use olcao_core::constants::{DEFAULT_MAKEINPUT_PATH, DEFAULT_MAX_WALLCLOCK_SECONDS, DEFAULT_OLCAO_RC};
use olcao_core::model::{Code, Resources, SinglefileData};
use olcao_core::WorkflowError;
use olcao_domain::{BasisSet, Edge, KPointMesh};

/// Opciones del scheduler que se propagan a cada calculación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowOptions {
    pub resources: Resources,
    pub max_wallclock_seconds: u64,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self { resources: Resources::default(),
               max_wallclock_seconds: DEFAULT_MAX_WALLCLOCK_SECONDS }
    }
}

fn default_calculations() -> Vec<String> {
    vec!["dos".to_string()]
}

fn default_olcao_rc() -> String {
    DEFAULT_OLCAO_RC.to_string()
}

fn default_makeinput_path() -> String {
    DEFAULT_MAKEINPUT_PATH.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseWorkChainInputs {
    pub code: Code,
    pub skeleton: SinglefileData,
    pub kpoints: KPointMesh,
    /// Tipos post-SCF pedidos; se validan en `setup` (no al deserializar)
    /// para poder reportar el nombre inválido con su exit code.
    #[serde(default = "default_calculations")]
    pub calculations: Vec<String>,
    #[serde(default)]
    pub basis_scf: BasisSet,
    #[serde(default)]
    pub basis_pscf: BasisSet,
    #[serde(default)]
    pub edge: Edge,
    #[serde(default = "default_olcao_rc")]
    pub olcao_rc: String,
    #[serde(default = "default_makeinput_path")]
    pub makeinput_path: String,
    #[serde(default)]
    pub options: WorkflowOptions,
}

impl BaseWorkChainInputs {
    pub fn new(code: Code, skeleton: SinglefileData, kpoints: KPointMesh) -> Self {
        Self { code,
               skeleton,
               kpoints,
               calculations: default_calculations(),
               basis_scf: BasisSet::default(),
               basis_pscf: BasisSet::default(),
               edge: Edge::default(),
               olcao_rc: default_olcao_rc(),
               makeinput_path: default_makeinput_path(),
               options: WorkflowOptions::default() }
    }

    pub fn calculations<I, S>(mut self, calculations: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.calculations = calculations.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_value(value: Value) -> Result<Self, WorkflowError> {
        serde_json::from_value(value).map_err(|e| WorkflowError::InvalidInputs(e.to_string()))
    }
}
