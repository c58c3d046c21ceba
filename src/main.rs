use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use olcaoflow::{default_registry, OlcaoConfig, PluginContext};

mod commands;

/// olcao - validate, run and inspect OLCAO calculations
#[derive(Parser)]
#[command(name = "olcao")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Working directory of the local engine (default: $OLCAO_WORK_DIR or .olcao-work)
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a parameter file (JSON) and print both command lines
    Validate {
        /// Path to the parameters JSON object
        params: PathBuf,
    },
    /// Parse a directory as a retrieved folder and print the results
    Parse {
        /// Directory holding the retrieved files
        dir: PathBuf,
    },
    /// Run SCF followed by post-SCF calculations with the local engine
    Run(commands::run::RunArgs),
    /// List recent OLCAO calculations
    List {
        /// Maximum number of calculations to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Only show calculations created within the last N days
        #[arg(long)]
        past_days: Option<i64>,
    },
    /// Export the retrieved files of a calculation
    Export(commands::export::ExportArgs),
}

fn main() -> Result<ExitCode> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = OlcaoConfig::from_env();
    if let Some(dir) = cli.work_dir {
        config.work_dir = dir;
    }
    log::debug!("olcao: work dir {}", config.work_dir.display());
    let registry = default_registry().context("failed to build plugin registry")?;
    let mut ctx = PluginContext::open(config, registry);

    let result = match cli.command {
        Commands::Validate { params } => commands::validate::run(&ctx, &params),
        Commands::Parse { dir } => commands::parse::run(&ctx, &dir),
        Commands::Run(args) => commands::run::run(&mut ctx, args),
        Commands::List { limit, past_days } => commands::list::run(&ctx, limit, past_days),
        Commands::Export(args) => commands::export::run(&ctx, args),
    };
    finish(&mut ctx, result)
}

/// Cierra el contexto también cuando el comando falló; el error del
/// comando tiene prioridad sobre el del cierre.
fn finish(ctx: &mut PluginContext, result: Result<ExitCode>) -> Result<ExitCode> {
    let closed = ctx.close();
    let code = result?;
    closed?;
    Ok(code)
}
