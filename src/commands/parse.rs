use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use olcao_core::model::RetrievedFolder;
use olcaoflow::{PluginContext, ENTRY_POINT};

pub fn run(ctx: &PluginContext, dir: &Path) -> Result<ExitCode> {
    let folder = RetrievedFolder::from_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    let parser = ctx.registry()?.parser(ENTRY_POINT)?;
    let outcome = parser.parse(Some(&folder));

    if let Some(out) = &outcome.output_parameters {
        println!("{}", serde_json::to_string_pretty(out)?);
    }
    match &outcome.exit_code {
        Some(code) => {
            eprintln!("[{}] {}: {code}", code.status(), code.label());
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}
