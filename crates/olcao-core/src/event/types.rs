//! Tipos de evento del workflow y estructura `WorkflowEvent`.
//!
//! Rol en el flujo:
//! - Cada corrida del workchain base emite eventos a un `EventStore`
//!   append-only (transiciones de step, envíos, reportes).
//! - Los eventos permiten reconstruir qué pasó en una corrida sin depender
//!   del estado mutable del workchain.
//! - `WorkflowEventKind` es el contrato observable del orquestador.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkflowEventKind {
    /// Primer evento de un `run_id`: nombre del workflow, outline y
    /// fingerprint de las entradas.
    RunInitialized {
        workflow: String,
        outline: Vec<String>,
        inputs_fingerprint: String,
    },
    StepStarted { step_index: usize, step_id: String },
    StepFinished { step_index: usize, step_id: String },
    /// El step terminó la corrida: exit code del workflow, o `None` si fue
    /// una falla del engine.
    StepFailed {
        step_index: usize,
        step_id: String,
        exit_status: Option<u32>,
        message: String,
    },
    CalculationSubmitted { calc_id: Uuid, label: String },
    /// Línea de reporte humano (también va al log en `info`).
    Report { message: String },
    /// Falla no fatal de una calculación post-SCF.
    PostScfFailed {
        calc_type: String,
        exit_status: Option<u32>,
        message: String,
    },
    /// Cierre de la corrida; `exit_status` 0 si terminó bien.
    RunCompleted { exit_status: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: WorkflowEventKind,
    pub ts: DateTime<Utc>,
}
