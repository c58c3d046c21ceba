//! Entradas de una calculación y la descripción de su invocación
//! (`CalcInfo`/`CodeInfo`) que devuelve `prepare_for_submission`.
use olcao_domain::OlcaoParameters;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::constants::*;
use crate::errors::CalcError;
use crate::model::{Code, SinglefileData};

/// Recursos del scheduler; opacos para el plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub num_machines: u32,
    pub num_mpiprocs_per_machine: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Self { num_machines: 1,
               num_mpiprocs_per_machine: 1 }
    }
}

/// Elemento de la lista de recuperación: nombre (o glob) o triple del engine
/// `[remote, local, depth]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetrieveItem {
    Name(String),
    Nested(String, String, u32),
}

impl RetrieveItem {
    /// Clave de deduplicación: el nombre tal cual, o la forma renderizada.
    pub fn dedup_key(&self) -> String {
        match self {
            RetrieveItem::Name(name) => name.clone(),
            other => other.to_string(),
        }
    }

    fn check_value(value: &Value) -> Result<(), CalcError> {
        let ok = match value {
            Value::String(_) => true,
            Value::Array(items) => {
                items.len() == 3 && items[0].is_string() && items[1].is_string() && items[2].is_u64()
            }
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(CalcError::InvalidOptions(format!("each element of additional_retrieve_list must be a string (filename) \
                                                   or a [remote, local, depth] triple, got {value}")))
        }
    }
}

impl From<&str> for RetrieveItem {
    fn from(name: &str) -> Self {
        RetrieveItem::Name(name.to_string())
    }
}

impl fmt::Display for RetrieveItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrieveItem::Name(name) => f.write_str(name),
            RetrieveItem::Nested(remote, local, depth) => write!(f, "('{remote}', '{local}', {depth})"),
        }
    }
}

/// Opciones de la calculación (`metadata.options`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcOptions {
    pub resources: Resources,
    pub max_wallclock_seconds: u64,
    pub input_filename: String,
    pub output_filename: String,
    pub scheduler_stdout: String,
    pub scheduler_stderr: String,
    /// Recuperar también stdout/stderr del scheduler. Apagado por defecto:
    /// no todos los schedulers los generan.
    pub retrieve_scheduler_output: bool,
    pub additional_retrieve_list: Option<Vec<RetrieveItem>>,
    pub parser_name: String,
}

impl Default for CalcOptions {
    fn default() -> Self {
        Self { resources: Resources::default(),
               max_wallclock_seconds: DEFAULT_MAX_WALLCLOCK_SECONDS,
               input_filename: DEFAULT_INPUT_FILENAME.to_string(),
               output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
               scheduler_stdout: DEFAULT_SCHEDULER_STDOUT.to_string(),
               scheduler_stderr: DEFAULT_SCHEDULER_STDERR.to_string(),
               retrieve_scheduler_output: false,
               additional_retrieve_list: None,
               parser_name: ENTRY_POINT.to_string() }
    }
}

impl CalcOptions {
    /// Deserializa opciones desde JSON validando la lista extra de
    /// recuperación con un mensaje explícito.
    pub fn from_value(value: Value) -> Result<Self, CalcError> {
        if let Some(extra) = value.get("additional_retrieve_list") {
            match extra {
                Value::Null => {}
                Value::Array(items) => items.iter().try_for_each(RetrieveItem::check_value)?,
                other => {
                    return Err(CalcError::InvalidOptions(format!("additional_retrieve_list must be a list (or omitted), got {other}")))
                }
            }
        }
        serde_json::from_value(value).map_err(|e| CalcError::InvalidOptions(e.to_string()))
    }
}

/// Artefacto de entrada: archivo OLCAO por stdin, o esqueleto para `makeinput`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CalcInput {
    InputFile { file: SinglefileData },
    Skeleton {
        file: SinglefileData,
        olcao_rc: String,
        makeinput_path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcInputs {
    pub code: Code,
    pub input: CalcInput,
    #[serde(default)]
    pub parameters: Option<OlcaoParameters>,
    #[serde(default)]
    pub options: CalcOptions,
}

impl CalcInputs {
    pub fn with_input_file(code: Code, file: SinglefileData) -> Self {
        Self { code,
               input: CalcInput::InputFile { file },
               parameters: None,
               options: CalcOptions::default() }
    }

    pub fn with_skeleton(code: Code, file: SinglefileData, olcao_rc: impl Into<String>, makeinput_path: impl Into<String>) -> Self {
        Self { code,
               input: CalcInput::Skeleton { file,
                                            olcao_rc: olcao_rc.into(),
                                            makeinput_path: makeinput_path.into() },
               parameters: None,
               options: CalcOptions::default() }
    }

    pub fn parameters(mut self, parameters: OlcaoParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn options(mut self, options: CalcOptions) -> Self {
        self.options = options;
        self
    }
}

/// Una invocación de un ejecutable dentro de la calculación.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeInfo {
    pub code_uuid: uuid::Uuid,
    pub cmdline_params: Vec<String>,
    pub stdin_name: Option<String>,
    pub stdout_name: Option<String>,
}

/// Instrucciones de ejecución y recuperación para el engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcInfo {
    pub codes_info: Vec<CodeInfo>,
    /// Shell que se ejecuta antes del código (entorno, `makeinput`).
    pub prepend_text: Option<String>,
    pub retrieve_list: Vec<RetrieveItem>,
}

impl CalcInfo {
    /// ¿Contiene la lista de recuperación el nombre `name`?
    pub fn retrieves(&self, name: &str) -> bool {
        self.retrieve_list.iter().any(|i| matches!(i, RetrieveItem::Name(n) if n == name))
    }
}
