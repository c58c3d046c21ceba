//! Calculación OLCAO: deposita la entrada en el sandbox y describe la
//! invocación de `uolcao` para el engine.
//!
//! Dos modos:
//! - archivo de entrada: se pasa por stdin a `uolcao`.
//! - esqueleto: se deposita `olcao.skl` y el `prepend_text` corre
//!   `makeinput` antes del código, que escribe sus propios `gs_*-*.out`.
use std::collections::HashSet;

use olcao_core::constants::{ENTRY_POINT, OLCAO_DAT_FILENAME, OUTPUT_FILE_PATTERN, SKELETON_FILENAME, SUMMARY_FILENAME};
use olcao_core::model::{CalcInfo, CalcInput, CalcInputs, CodeInfo, RetrieveItem, SandboxFolder};
use olcao_core::{CalcError, CalcJob};
use olcao_domain::OlcaoParameters;

#[derive(Debug, Default, Clone, Copy)]
pub struct OlcaoCalculation;

impl OlcaoCalculation {
    pub fn new() -> Self {
        Self
    }
}

/// Shell previo en modo esqueleto: entorno OLCAO, directorio temporal y
/// `makeinput` con las mallas k.
fn skeleton_prepend_text(olcao_rc: &str, makeinput_path: &str, makeinput_cmdline: &str) -> String {
    format!("source {olcao_rc}\n\
             export OLCAO_TEMP=\"$PWD/olcao_temp\"\n\
             mkdir -p \"$OLCAO_TEMP\"\n\
             {makeinput_path} {makeinput_cmdline}\n")
}

/// Lista de recuperación sin duplicados, en orden de primera aparición.
fn dedup_retrieve_list(items: Vec<RetrieveItem>) -> Vec<RetrieveItem> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.dedup_key())).collect()
}

impl CalcJob for OlcaoCalculation {
    fn entry_point(&self) -> &'static str {
        ENTRY_POINT
    }

    fn default_parser(&self) -> &'static str {
        ENTRY_POINT
    }

    fn prepare_for_submission(&self, inputs: &CalcInputs, sandbox: &mut SandboxFolder) -> Result<CalcInfo, CalcError> {
        let options = &inputs.options;
        if let Some(params) = &inputs.parameters {
            params.validate()?;
        }

        let mut retrieve: Vec<RetrieveItem> = vec![options.output_filename.as_str().into()];
        let mut code_info = CodeInfo { code_uuid: inputs.code.uuid,
                                       stdout_name: Some(options.output_filename.clone()),
                                       ..Default::default() };
        let mut prepend_text = None;

        match &inputs.input {
            CalcInput::InputFile { file } => {
                sandbox.create_file_from_bytes(&options.input_filename, file.content.as_bytes())?;
                code_info.stdin_name = Some(options.input_filename.clone());
                if let Some(params) = &inputs.parameters {
                    code_info.cmdline_params = params.uolcao_args()?;
                }
            }
            CalcInput::Skeleton { file,
                                  olcao_rc,
                                  makeinput_path, } => {
                sandbox.create_file_from_bytes(SKELETON_FILENAME, file.content.as_bytes())?;
                let defaults = OlcaoParameters::default();
                let params = inputs.parameters.as_ref().unwrap_or(&defaults);
                prepend_text = Some(skeleton_prepend_text(olcao_rc, makeinput_path, &params.get_makeinput_cmdline()?));
                code_info.cmdline_params = params.uolcao_args()?;
                retrieve.extend([OUTPUT_FILE_PATTERN, SUMMARY_FILENAME, OLCAO_DAT_FILENAME].map(RetrieveItem::from));
            }
        }

        if options.retrieve_scheduler_output {
            retrieve.push(options.scheduler_stdout.as_str().into());
            retrieve.push(options.scheduler_stderr.as_str().into());
        }
        if let Some(extra) = &options.additional_retrieve_list {
            retrieve.extend(extra.iter().cloned());
        }

        log::debug!("calculation: prepared uolcao {:?} for code {}", code_info.cmdline_params, inputs.code.label);
        Ok(CalcInfo { codes_info: vec![code_info],
                      prepend_text,
                      retrieve_list: dedup_retrieve_list(retrieve) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_seen_order() {
        let items = vec![RetrieveItem::from("olcao.out"),
                         RetrieveItem::from("a"),
                         RetrieveItem::Nested("x".into(), ".".into(), 0),
                         RetrieveItem::from("olcao.out"),
                         RetrieveItem::Nested("x".into(), ".".into(), 0)];
        let out = dedup_retrieve_list(items);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], RetrieveItem::from("olcao.out"));
        assert_eq!(out[2], RetrieveItem::Nested("x".into(), ".".into(), 0));
    }

    #[test]
    fn prepend_text_shape() {
        let text = skeleton_prepend_text("/test/olcaorc", "/test/makeinput", "-kp 3 3 3");
        assert!(text.starts_with("source /test/olcaorc\n"));
        assert!(text.contains("export OLCAO_TEMP="));
        assert!(text.contains("/test/makeinput -kp 3 3 3"));
    }
}
