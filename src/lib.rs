//! olcaoflow: plugin OLCAO (parámetros, calculación, parser y workchain
//! SCF → post-SCF) más un engine local para correrlo sin infraestructura.
//!
//! Los crates del workspace se re-exportan; `default_registry()` arma el
//! registro explícito con todas las capacidades del plugin.

pub use olcao_adapters::{parse_olcao_output, OlcaoCalculation, OlcaoParser};
pub use olcao_core::constants::{BASE_WORKFLOW_ENTRY_POINT, ENTRY_POINT};
pub use olcao_core::{CalcJob, Engine, OlcaoConfig, OutputParser, PluginContext, PluginRegistry, RegistryError, Workflow};
pub use olcao_domain::{BasisSet, CalculationType, Edge, KPointMesh, OlcaoParameters};
pub use olcao_infra::{CalcRecordStore, LocalEngine};
pub use olcao_workflows::{BaseWorkChainInputs, OlcaoBaseWorkChain};

/// Registro con `calculation:olcao`, `parser:olcao`, `data:olcao` y
/// `workflow:olcao.base`.
pub fn default_registry() -> Result<PluginRegistry, RegistryError> {
    let mut registry = PluginRegistry::new();
    registry.register_calculation(ENTRY_POINT, || Box::new(OlcaoCalculation::new()) as Box<dyn CalcJob>)?;
    registry.register_parser(ENTRY_POINT, || Box::new(OlcaoParser::new()) as Box<dyn OutputParser>)?;
    registry.register_data(ENTRY_POINT, OlcaoParameters::from_value)?;
    registry.register_workflow(BASE_WORKFLOW_ENTRY_POINT, OlcaoBaseWorkChain::from_value)?;
    Ok(registry)
}
