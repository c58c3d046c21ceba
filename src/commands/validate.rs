use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use olcaoflow::{PluginContext, ENTRY_POINT};

pub fn run(ctx: &PluginContext, path: &Path) -> Result<ExitCode> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("failed to parse JSON in {}", path.display()))?;
    let make = ctx.registry()?.data(ENTRY_POINT)?;
    let params = make(value).with_context(|| format!("invalid parameters in {}", path.display()))?;

    println!("makeinput: {}", params.get_makeinput_cmdline()?);
    println!("uolcao:    {}", params.get_uolcao_cmdline()?);
    Ok(ExitCode::SUCCESS)
}
