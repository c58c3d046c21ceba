use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use olcao_core::model::{Code, SinglefileData};
use olcao_core::WorkflowError;
use olcao_workflows::WorkflowOptions;
use olcaoflow::{BaseWorkChainInputs, BasisSet, Edge, KPointMesh, LocalEngine, PluginContext, BASE_WORKFLOW_ENTRY_POINT};

#[derive(Args)]
pub struct RunArgs {
    /// Path to the uolcao executable
    #[arg(long)]
    code: PathBuf,
    /// OLCAO skeleton file (.skl)
    #[arg(long)]
    skeleton: PathBuf,
    /// K-point mesh as three positive integers
    #[arg(long, required = true, num_args = 3, value_names = ["A", "B", "C"])]
    kpoints: Vec<u32>,
    /// Post-SCF calculation types to run (repeatable)
    #[arg(long = "calc", default_values_t = ["dos".to_string()])]
    calculations: Vec<String>,
    /// Basis set for SCF: EB, FB or MB
    #[arg(long, default_value = "FB")]
    basis_scf: BasisSet,
    /// Basis set for post-SCF; FB applies the recommended basis per type
    #[arg(long, default_value = "FB")]
    basis_pscf: BasisSet,
    /// Edge for excited state calculations (gs, 1s, 2p, ...)
    #[arg(long, default_value = "gs")]
    edge: Edge,
}

pub fn run(ctx: &mut PluginContext, args: RunArgs) -> Result<ExitCode> {
    let [a, b, c] = <[u32; 3]>::try_from(args.kpoints).map_err(|v| anyhow::anyhow!("expected 3 k-points, got {}", v.len()))?;
    let kpoints = KPointMesh::new(a, b, c)?;
    let skeleton = SinglefileData::from_path(&args.skeleton).with_context(|| format!("failed to read skeleton {}",
                                                                                       args.skeleton.display()))?;
    let config = ctx.config()?.clone();

    let mut inputs = BaseWorkChainInputs::new(Code::new("uolcao", args.code), skeleton, kpoints).calculations(args.calculations);
    inputs.basis_scf = args.basis_scf;
    inputs.basis_pscf = args.basis_pscf;
    inputs.edge = args.edge;
    inputs.olcao_rc = config.olcao_rc.clone();
    inputs.makeinput_path = config.makeinput_path.clone();
    inputs.options = WorkflowOptions { resources: config.resources.clone(),
                                       max_wallclock_seconds: config.max_wallclock_seconds };

    let registry = ctx.registry()?.clone();
    let build = registry.workflow(BASE_WORKFLOW_ENTRY_POINT)?;
    let mut workflow = build(serde_json::to_value(&inputs)?)?;
    let engine = LocalEngine::new(registry, &config.work_dir);

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(workflow.run(&engine, ctx)) {
        Ok(outputs) => {
            println!("{}", serde_json::to_string_pretty(&outputs)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(WorkflowError::Exit(code)) => {
            eprintln!("[{}] {}: {code}", code.status(), code.label());
            Ok(ExitCode::FAILURE)
        }
        Err(other) => Err(other).context("workflow aborted"),
    }
}
