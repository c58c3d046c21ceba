//! olcao-core: contratos neutrales entre el plugin OLCAO y el engine.
//!
//! - `model`: entradas, CalcInfo, carpetas y resultados.
//! - `engine`: trait `Engine` (submit/wait asíncronos).
//! - `process`: traits `CalcJob`, `OutputParser`, `Workflow`.
//! - `registry` / `context`: registro explícito y contexto de ejecución.
//! - `event` / `hashing`: log de eventos y fingerprints de entradas.

pub mod config;
pub mod constants;
pub mod context;
pub mod engine;
pub mod errors;
pub mod event;
pub mod exit_code;
pub mod hashing;
pub mod model;
pub mod pattern;
pub mod process;
pub mod registry;

pub use config::OlcaoConfig;
pub use context::PluginContext;
pub use engine::{CalcHandle, CalcNode, CalcRequest, Engine, ProcessState};
pub use errors::{CalcError, ContextError, EngineError, RegistryError, WorkflowError};
pub use event::{EventStore, InMemoryEventStore, WorkflowEvent, WorkflowEventKind};
pub use exit_code::{format_exit_status, CalcExitCode, WorkflowExitCode};
pub use process::{CalcJob, OutputParser, ParseOutcome, Workflow};
pub use registry::{CapabilityKind, PluginRegistry};
