//! Interfaz con el engine de workflows externo.
//!
//! El plugin nunca ejecuta OLCAO directamente: entrega `CalcRequest`s al
//! engine y espera nodos terminados. Implementaciones: `LocalEngine`
//! (`olcao-infra`) y engines falsos en tests.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EngineError;
use crate::model::{CalcInputs, OutputParameters};

/// Pedido de ejecución de una calculación registrada.
#[derive(Debug, Clone)]
pub struct CalcRequest {
    /// Entry point de la calculación en el registry (p.ej. `olcao`).
    pub process: String,
    pub inputs: CalcInputs,
    pub label: String,
    pub description: Option<String>,
}

impl CalcRequest {
    pub fn new(process: impl Into<String>, inputs: CalcInputs, label: impl Into<String>) -> Self {
        Self { process: process.into(),
               inputs,
               label: label.into(),
               description: None }
    }
}

/// Referencia a una calculación enviada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalcHandle {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Created,
    Running,
    Finished,
    Excepted,
    Killed,
}

impl ProcessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessState::Created => "created",
            ProcessState::Running => "running",
            ProcessState::Finished => "finished",
            ProcessState::Excepted => "excepted",
            ProcessState::Killed => "killed",
        }
    }
}

/// Nodo de una calculación, tal como lo ve el workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcNode {
    pub id: Uuid,
    pub label: String,
    pub state: ProcessState,
    pub exit_status: Option<u32>,
    pub exit_message: Option<String>,
    pub outputs: Option<OutputParameters>,
    pub ctime: DateTime<Utc>,
}

impl CalcNode {
    /// Terminó y sin exit status de error.
    pub fn is_finished_ok(&self) -> bool {
        self.state == ProcessState::Finished && self.exit_status.unwrap_or(0) == 0
    }
}

#[async_trait]
pub trait Engine: Send + Sync {
    /// Envía la calculación; no espera a que termine.
    async fn submit(&self, request: CalcRequest) -> Result<CalcHandle, EngineError>;
    /// Espera a que la calculación alcance un estado terminal.
    async fn wait(&self, handle: &CalcHandle) -> Result<CalcNode, EngineError>;
}
