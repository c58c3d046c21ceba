//! Parser de la carpeta recuperada de una calculación OLCAO.
use olcao_core::constants::{OLCAO_DAT_FILENAME, OUTPUT_FILE_PATTERN, SUMMARY_FILENAME};
use olcao_core::model::{OutputParameters, RetrievedFolder};
use olcao_core::{pattern, CalcExitCode, OutputParser, ParseOutcome};

use super::text::parse_olcao_output;

pub const WARN_MAKEINPUT_FAILED: &str = "No OLCAO output files found - makeinput may have failed";
pub const WARN_NO_OUTPUT_FILES: &str = "No gs_*-*.out files found";

/// Nombres que coinciden con `gs_*-*.out`, en el orden dado.
pub fn find_output_files(names: &[String]) -> Vec<String> {
    pattern::filter(OUTPUT_FILE_PATTERN, names)
}

/// Texto (UTF-8 con reemplazo) y tamaño en bytes crudos.
fn read_text(folder: &RetrievedFolder, name: &str) -> std::io::Result<(String, u64)> {
    let bytes = folder.get_object_content(name)?;
    Ok((String::from_utf8_lossy(bytes).into_owned(), bytes.len() as u64))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OlcaoParser;

impl OlcaoParser {
    pub fn new() -> Self {
        Self
    }
}

impl OutputParser for OlcaoParser {
    fn parse(&self, retrieved: Option<&RetrievedFolder>) -> ParseOutcome {
        let Some(folder) = retrieved else {
            log::warn!("parser: no retrieved folder");
            return ParseOutcome { output_parameters: None,
                                  exit_code: Some(CalcExitCode::NoRetrievedFolder) };
        };
        let names = folder.list_object_names();
        let mut out = OutputParameters { retrieved_files: names.clone(),
                                         ..Default::default() };

        let mut outputs = find_output_files(&names);
        if outputs.is_empty() {
            let (warning, code) = if folder.contains(SUMMARY_FILENAME) || folder.contains(OLCAO_DAT_FILENAME) {
                (WARN_NO_OUTPUT_FILES, CalcExitCode::MissingOutputFile)
            } else {
                (WARN_MAKEINPUT_FAILED, CalcExitCode::MakeinputFailed)
            };
            log::warn!("parser: {warning}");
            out.parser_warnings.push(warning.to_string());
            return ParseOutcome { output_parameters: Some(out),
                                  exit_code: Some(code) };
        }
        outputs.sort();
        let main = outputs.swap_remove(0);
        out.output_file = Some(main.clone());

        let text = match read_text(folder, &main) {
            Ok((text, size)) => {
                out.output_size_bytes = Some(size);
                text
            }
            Err(e) => {
                out.parser_error = Some(format!("Failed to read {main}: {e}"));
                return ParseOutcome { output_parameters: Some(out),
                                      exit_code: Some(CalcExitCode::MissingOutputFile) };
            }
        };
        out.parsed = parse_olcao_output(&text);
        log::debug!("parser: {main} ({} bytes) parsed", text.len());

        // el summary sólo completa claves ausentes; si no se lee, se ignora
        if folder.contains(SUMMARY_FILENAME) {
            if let Ok((summary, _)) = read_text(folder, SUMMARY_FILENAME) {
                out.parsed.fill_missing_from(parse_olcao_output(&summary));
            }
        }

        let exit_code = if out.parsed.has_error == Some(true) {
            Some(CalcExitCode::ScfFailed)
        } else if out.parsed.converged == Some(false) {
            Some(CalcExitCode::NotConverged)
        } else {
            None
        };
        ParseOutcome { output_parameters: Some(out),
                       exit_code }
    }
}
