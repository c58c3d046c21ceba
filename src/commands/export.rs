use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use olcao_core::model::RetrievedFolder;
use olcaoflow::{CalcRecordStore, PluginContext, ENTRY_POINT};

#[derive(Args)]
pub struct ExportArgs {
    /// Calculation id (full UUID or unique prefix)
    id: String,
    /// Directory where retrieved files will be exported
    #[arg(long = "out", default_value = ".")]
    outdir: PathBuf,
    /// Export into a dedicated `olcao_export_<id>` subfolder (default)
    #[arg(long, overrides_with = "no_subdir")]
    subdir: bool,
    /// Export directly into --out
    #[arg(long, overrides_with = "subdir")]
    no_subdir: bool,
}

impl ExportArgs {
    /// El último de `--subdir`/`--no-subdir` gana; sin ninguno, subcarpeta.
    fn use_subdir(&self) -> bool {
        self.subdir || !self.no_subdir
    }
}

pub fn run(ctx: &PluginContext, args: ExportArgs) -> Result<ExitCode> {
    let store = CalcRecordStore::new(&ctx.config()?.work_dir);
    let record = store.find(&args.id)?;
    if record.process != ENTRY_POINT {
        anyhow::bail!("calculation {} is not an OLCAO calculation (process={})", record.id, record.process);
    }
    let source = store.retrieved_dir(record.id);
    if !source.is_dir() {
        anyhow::bail!("calculation {} has no retrieved files", record.id);
    }
    let retrieved = RetrievedFolder::from_dir(&source).with_context(|| format!("failed to read {}", source.display()))?;

    let target = if args.use_subdir() {
        args.outdir.join(format!("olcao_export_{}", record.id))
    } else {
        args.outdir
    };
    std::fs::create_dir_all(&target).with_context(|| format!("failed to create {}", target.display()))?;

    let names = retrieved.list_object_names();
    if names.is_empty() {
        println!("No files to export for calculation {}.", record.id);
        return Ok(ExitCode::SUCCESS);
    }
    for name in &names {
        let dest = target.join(name);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, retrieved.get_object_content(name)?).with_context(|| format!("failed to write {}", dest.display()))?;
    }
    println!("Exported {} file(s) to: {}", names.len(), target.canonicalize()?.display());
    Ok(ExitCode::SUCCESS)
}
