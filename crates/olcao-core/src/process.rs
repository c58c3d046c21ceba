//! Contratos que el plugin implementa para el engine: calculación, parser
//! y workflow.
use async_trait::async_trait;
use serde_json::Value;

use crate::context::PluginContext;
use crate::engine::Engine;
use crate::errors::{CalcError, WorkflowError};
use crate::exit_code::CalcExitCode;
use crate::model::{CalcInfo, CalcInputs, OutputParameters, RetrievedFolder, SandboxFolder};

/// Calculación: traduce entradas a archivos en el sandbox + `CalcInfo`.
pub trait CalcJob: Send + Sync {
    fn entry_point(&self) -> &'static str;
    /// Parser que el engine usa si las opciones no nombran otro.
    fn default_parser(&self) -> &'static str;
    fn prepare_for_submission(&self, inputs: &CalcInputs, sandbox: &mut SandboxFolder) -> Result<CalcInfo, CalcError>;
}

/// Resultado de parsear: mapa de salida (si lo hay) y exit code (si falló).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub output_parameters: Option<OutputParameters>,
    pub exit_code: Option<CalcExitCode>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.exit_code.is_none()
    }

    pub fn exit_status(&self) -> Option<u32> {
        self.exit_code.as_ref().map(CalcExitCode::status)
    }
}

/// Parser de la carpeta recuperada. `None` = el engine no recuperó nada.
pub trait OutputParser: Send + Sync {
    fn parse(&self, retrieved: Option<&RetrievedFolder>) -> ParseOutcome;
}

/// Workflow orquestado sobre un engine.
#[async_trait]
pub trait Workflow: Send {
    fn entry_point(&self) -> &'static str;
    /// Corre el outline completo y devuelve las salidas del workflow.
    async fn run(&mut self, engine: &dyn Engine, ctx: &mut PluginContext) -> Result<Value, WorkflowError>;
}
