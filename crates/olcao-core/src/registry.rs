//! Registro explícito de capacidades del plugin.
//!
//! Reemplaza el descubrimiento por entry points: el binario arma un
//! `PluginRegistry` al arrancar y todo lookup pasa por aquí. Un nombre
//! desconocido es un `RegistryError::Unregistered` tipado.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use olcao_domain::{OlcaoParameters, ParameterError};

use crate::errors::{RegistryError, WorkflowError};
use crate::process::{CalcJob, OutputParser, Workflow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Calculation,
    Parser,
    Data,
    Workflow,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        CapabilityKind::Calculation => "calculation",
                        CapabilityKind::Parser => "parser",
                        CapabilityKind::Data => "data",
                        CapabilityKind::Workflow => "workflow",
                    })
    }
}

pub type CalcFactory = fn() -> Box<dyn CalcJob>;
pub type ParserFactory = fn() -> Box<dyn OutputParser>;
/// Constructor validante del tipo de datos de parámetros.
pub type DataFactory = fn(Value) -> Result<OlcaoParameters, ParameterError>;
/// Construye un workflow a partir de sus entradas JSON.
pub type WorkflowFactory = fn(Value) -> Result<Box<dyn Workflow>, WorkflowError>;

#[derive(Clone, Default)]
pub struct PluginRegistry {
    calculations: BTreeMap<String, CalcFactory>,
    parsers: BTreeMap<String, ParserFactory>,
    data: BTreeMap<String, DataFactory>,
    workflows: BTreeMap<String, WorkflowFactory>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}

fn insert<F>(map: &mut BTreeMap<String, F>, kind: CapabilityKind, name: &str, factory: F) -> Result<(), RegistryError> {
    if map.contains_key(name) {
        return Err(RegistryError::Duplicate { kind,
                                              name: name.to_string() });
    }
    log::debug!("registry: {kind}:{name}");
    map.insert(name.to_string(), factory);
    Ok(())
}

fn lookup<F: Copy>(map: &BTreeMap<String, F>, kind: CapabilityKind, name: &str) -> Result<F, RegistryError> {
    map.get(name).copied().ok_or_else(|| RegistryError::Unregistered { kind,
                                                                      name: name.to_string() })
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_calculation(&mut self, name: &str, factory: CalcFactory) -> Result<(), RegistryError> {
        insert(&mut self.calculations, CapabilityKind::Calculation, name, factory)
    }

    pub fn register_parser(&mut self, name: &str, factory: ParserFactory) -> Result<(), RegistryError> {
        insert(&mut self.parsers, CapabilityKind::Parser, name, factory)
    }

    pub fn register_data(&mut self, name: &str, factory: DataFactory) -> Result<(), RegistryError> {
        insert(&mut self.data, CapabilityKind::Data, name, factory)
    }

    pub fn register_workflow(&mut self, name: &str, factory: WorkflowFactory) -> Result<(), RegistryError> {
        insert(&mut self.workflows, CapabilityKind::Workflow, name, factory)
    }

    pub fn calculation(&self, name: &str) -> Result<Box<dyn CalcJob>, RegistryError> {
        lookup(&self.calculations, CapabilityKind::Calculation, name).map(|f| f())
    }

    pub fn parser(&self, name: &str) -> Result<Box<dyn OutputParser>, RegistryError> {
        lookup(&self.parsers, CapabilityKind::Parser, name).map(|f| f())
    }

    pub fn data(&self, name: &str) -> Result<DataFactory, RegistryError> {
        lookup(&self.data, CapabilityKind::Data, name)
    }

    pub fn workflow(&self, name: &str) -> Result<WorkflowFactory, RegistryError> {
        lookup(&self.workflows, CapabilityKind::Workflow, name)
    }

    /// `(kind, name)` registrados, ordenados por kind y nombre.
    pub fn entries(&self) -> Vec<(CapabilityKind, String)> {
        let mut out = Vec::new();
        out.extend(self.calculations.keys().map(|n| (CapabilityKind::Calculation, n.clone())));
        out.extend(self.parsers.keys().map(|n| (CapabilityKind::Parser, n.clone())));
        out.extend(self.data.keys().map(|n| (CapabilityKind::Data, n.clone())));
        out.extend(self.workflows.keys().map(|n| (CapabilityKind::Workflow, n.clone())));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_typed_errors() {
        let reg = PluginRegistry::new();
        let err = reg.calculation("olcao").err().unwrap();
        assert_eq!(err,
                   RegistryError::Unregistered { kind: CapabilityKind::Calculation,
                                                 name: "olcao".into() });
        assert_eq!(err.to_string(), "unregistered capability calculation:olcao");
        assert!(matches!(reg.workflow("olcao.base"), Err(RegistryError::Unregistered { kind: CapabilityKind::Workflow, .. })));
    }

    #[test]
    fn data_factory_roundtrip_and_duplicates() {
        let mut reg = PluginRegistry::new();
        reg.register_data("olcao", OlcaoParameters::from_value).unwrap();
        let dup = reg.register_data("olcao", OlcaoParameters::from_value).unwrap_err();
        assert!(matches!(dup, RegistryError::Duplicate { kind: CapabilityKind::Data, .. }));
        let make = reg.data("olcao").unwrap();
        assert!(make(serde_json::json!({"kpoints": [2, 2, 2]})).is_ok());
        assert!(make(serde_json::json!({"kpoints": [0, 2, 2]})).is_err());
        assert_eq!(reg.entries(), vec![(CapabilityKind::Data, "olcao".to_string())]);
    }
}
