//! Workchain base: SCF seguido de uno o más cálculos post-SCF.
//!
//! Outline lineal `setup → run_scf → inspect_scf → run_post_scf → results`.
//! Cada step que termina la corrida lo hace con un `WorkflowExitCode`; las
//! fallas post-SCF se reportan pero no son fatales.
//!
//! Cada transición de step y cada línea de reporte se agregan al log de
//! eventos del `PluginContext` bajo el `run_id` de la corrida.
use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use olcao_core::constants::{BASE_WORKFLOW_ENTRY_POINT, ENTRY_POINT, EXIT_STATUS_NOT_CONVERGED};
use olcao_core::hashing::inputs_fingerprint;
use olcao_core::model::{CalcInputs, CalcOptions, OutputParameters};
use olcao_core::{format_exit_status, CalcHandle, CalcNode, CalcRequest, Engine, PluginContext, Workflow, WorkflowError,
                 WorkflowEventKind, WorkflowExitCode};
use olcao_domain::{BasisSet, CalculationType, OlcaoParameters};

use crate::inputs::BaseWorkChainInputs;
use crate::outputs::{merge_outputs, WorkChainOutputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Setup,
    RunScf,
    InspectScf,
    RunPostScf,
    Results,
}

impl Step {
    pub const OUTLINE: [Step; 5] = [Step::Setup, Step::RunScf, Step::InspectScf, Step::RunPostScf, Step::Results];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Setup => "setup",
            Step::RunScf => "run_scf",
            Step::InspectScf => "inspect_scf",
            Step::RunPostScf => "run_post_scf",
            Step::Results => "results",
        }
    }
}

/// Estado acumulado entre steps.
#[derive(Debug, Default)]
struct RunState {
    requested: Vec<CalculationType>,
    scf: Option<CalcNode>,
    scf_total_energy: Option<f64>,
    scf_fermi_energy: Option<f64>,
    /// Resultado por tipo post-SCF; `Err` = el engine no pudo enviar o esperar el nodo.
    post_scf: IndexMap<CalculationType, Result<CalcNode, String>>,
}

/// Base post-SCF efectiva: con el default `FB` se usa la tabla recomendada
/// por tipo; cualquier otro valor explícito se respeta.
pub fn post_scf_basis(calc: CalculationType, requested: BasisSet) -> BasisSet {
    if requested == BasisSet::Full {
        calc.recommended_basis().unwrap_or(requested)
    } else {
        requested
    }
}

pub struct OlcaoBaseWorkChain {
    inputs: BaseWorkChainInputs,
    run_id: Uuid,
    state: RunState,
    outputs: Option<WorkChainOutputs>,
}

impl OlcaoBaseWorkChain {
    pub fn new(inputs: BaseWorkChainInputs) -> Self {
        Self { inputs,
               run_id: Uuid::new_v4(),
               state: RunState::default(),
               outputs: None }
    }

    /// Constructor para el registry: entradas JSON → workflow.
    pub fn from_value(value: Value) -> Result<Box<dyn Workflow>, WorkflowError> {
        Ok(Box::new(Self::new(BaseWorkChainInputs::from_value(value)?)))
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Salidas, disponibles sólo tras una corrida exitosa.
    pub fn outputs(&self) -> Option<&WorkChainOutputs> {
        self.outputs.as_ref()
    }

    pub fn scf_energies(&self) -> (Option<f64>, Option<f64>) {
        (self.state.scf_total_energy, self.state.scf_fermi_energy)
    }

    fn report(&self, ctx: &mut PluginContext, message: impl Into<String>) -> Result<(), WorkflowError> {
        let message = message.into();
        log::info!("[{}|{}] {message}", BASE_WORKFLOW_ENTRY_POINT, self.run_id);
        ctx.append_event(self.run_id, WorkflowEventKind::Report { message })?;
        Ok(())
    }

    fn calc_request(&self, params: OlcaoParameters, label: &str, description: String) -> CalcRequest {
        let options = CalcOptions { resources: self.inputs.options.resources.clone(),
                                    max_wallclock_seconds: self.inputs.options.max_wallclock_seconds,
                                    ..CalcOptions::default() };
        let inputs = CalcInputs::with_skeleton(self.inputs.code.clone(),
                                               self.inputs.skeleton.clone(),
                                               self.inputs.olcao_rc.clone(),
                                               self.inputs.makeinput_path.clone()).parameters(params)
                                                                                  .options(options);
        let mut request = CalcRequest::new(ENTRY_POINT, inputs, label);
        request.description = Some(description);
        request
    }

    async fn submit(&self, engine: &dyn Engine, ctx: &mut PluginContext, request: CalcRequest)
                    -> Result<CalcHandle, WorkflowError> {
        let handle = engine.submit(request).await?;
        ctx.append_event(self.run_id,
                          WorkflowEventKind::CalculationSubmitted { calc_id: handle.id,
                                                                    label: handle.label.clone() })?;
        Ok(handle)
    }

    fn setup(&mut self, ctx: &mut PluginContext) -> Result<(), WorkflowError> {
        self.report(ctx, "Setting up OlcaoBaseWorkChain")?;
        let mut requested = Vec::new();
        for name in &self.inputs.calculations {
            match name.parse::<CalculationType>() {
                Ok(calc) if calc.is_post_scf() => {
                    if !requested.contains(&calc) {
                        requested.push(calc);
                    }
                }
                _ => return Err(WorkflowExitCode::InvalidCalculationType { calc_type: name.clone() }.into()),
            }
        }
        let names = requested.iter().map(CalculationType::as_str).collect::<Vec<_>>().join(", ");
        self.state.requested = requested;
        self.report(ctx, format!("Will run SCF followed by: {names}"))
    }

    async fn run_scf(&mut self, engine: &dyn Engine, ctx: &mut PluginContext) -> Result<(), WorkflowError> {
        self.report(ctx, "Submitting SCF calculation")?;
        let params = OlcaoParameters::builder().kpoints(self.inputs.kpoints)
                                               .calculation_type(CalculationType::Scf)
                                               .basis_scf(self.inputs.basis_scf)
                                               .build();
        let request = self.calc_request(params, "scf", "SCF calculation from OlcaoBaseWorkChain".to_string());
        let handle = self.submit(engine, ctx, request).await?;
        self.report(ctx, format!("Submitted SCF calculation <{}>", handle.id))?;
        self.state.scf = Some(engine.wait(&handle).await?);
        Ok(())
    }

    fn inspect_scf(&mut self, ctx: &mut PluginContext) -> Result<(), WorkflowError> {
        let Some(scf) = self.state.scf.clone() else {
            return Err(WorkflowExitCode::ScfFailed { exit_status: format_exit_status(None) }.into());
        };
        if !scf.is_finished_ok() {
            self.report(ctx,
                        format!("SCF calculation failed with exit status {}", format_exit_status(scf.exit_status)))?;
            if scf.exit_status == Some(EXIT_STATUS_NOT_CONVERGED) {
                return Err(WorkflowExitCode::ScfNotConverged.into());
            }
            return Err(WorkflowExitCode::ScfFailed { exit_status: format_exit_status(scf.exit_status) }.into());
        }
        let outputs = scf.outputs.unwrap_or_default();
        if outputs.converged() == Some(false) {
            self.report(ctx, "SCF did not converge according to output")?;
            return Err(WorkflowExitCode::ScfNotConverged.into());
        }
        self.report(ctx, "SCF converged successfully")?;
        self.state.scf_total_energy = outputs.parsed.total_energy;
        self.state.scf_fermi_energy = outputs.parsed.fermi_energy;
        Ok(())
    }

    async fn run_post_scf(&mut self, engine: &dyn Engine, ctx: &mut PluginContext) -> Result<(), WorkflowError> {
        if self.state.requested.is_empty() {
            return self.report(ctx, "No post-SCF calculations requested");
        }
        let names: Vec<&str> = self.state.requested.iter().map(CalculationType::as_str).collect();
        self.report(ctx, format!("Submitting post-SCF calculations: {}", names.join(", ")))?;

        // se envían todas antes de esperar cualquiera; un envío rechazado
        // cuenta como falla post-SCF de ese tipo
        let mut submitted: Vec<(CalculationType, Result<CalcHandle, String>)> =
            Vec::with_capacity(self.state.requested.len());
        for calc in self.state.requested.clone() {
            let basis_pscf = post_scf_basis(calc, self.inputs.basis_pscf);
            let params = OlcaoParameters::builder().kpoints(self.inputs.kpoints)
                                                   .calculation_type(calc)
                                                   .basis_scf(self.inputs.basis_scf)
                                                   .basis_pscf(basis_pscf)
                                                   .edge(self.inputs.edge)
                                                   .build();
            let upper = calc.as_str().to_uppercase();
            let request = self.calc_request(params, calc.as_str(), format!("{upper} calculation from OlcaoBaseWorkChain"));
            match self.submit(engine, ctx, request).await {
                Ok(handle) => {
                    self.report(ctx, format!("Submitted {upper} calculation <{}> with basis_pscf={basis_pscf}", handle.id))?;
                    submitted.push((calc, Ok(handle)));
                }
                Err(WorkflowError::Engine(e)) => {
                    self.report(ctx, format!("Could not submit {upper} calculation: {e}"))?;
                    submitted.push((calc, Err(format!("submission failed: {e}"))));
                }
                Err(e) => return Err(e),
            }
        }

        let nodes = join_all(submitted.iter().map(|(_, handle)| async move {
                                                 match handle {
                                                     Ok(handle) => engine.wait(handle).await.map_err(|e| e.to_string()),
                                                     Err(msg) => Err(msg.clone()),
                                                 }
                                             })).await;
        for ((calc, _), node) in submitted.into_iter().zip(nodes) {
            self.state.post_scf.insert(calc, node);
        }
        Ok(())
    }

    fn results(&mut self, ctx: &mut PluginContext) -> Result<(), WorkflowError> {
        self.report(ctx, "Gathering results")?;
        let scf_parameters = self.state
                                 .scf
                                 .as_ref()
                                 .and_then(|n| n.outputs.clone())
                                 .unwrap_or_default();

        let mut post_scf_parameters: IndexMap<String, OutputParameters> = IndexMap::new();
        for (calc, node) in &self.state.post_scf {
            let (exit_status, message) = match node {
                Ok(node) if node.is_finished_ok() => {
                    post_scf_parameters.insert(calc.as_str().to_string(), node.outputs.clone().unwrap_or_default());
                    continue;
                }
                Ok(node) => (node.exit_status, node.exit_message.clone()),
                Err(e) => (None, Some(e.clone())),
            };
            let code = WorkflowExitCode::PostScfFailed { calc_type: calc.as_str().to_string(),
                                                         exit_status: format_exit_status(exit_status) };
            self.report(ctx,
                        format!("Warning: {} failed with exit status {}",
                                calc.as_str().to_uppercase(),
                                format_exit_status(exit_status)))?;
            if let Some(detail) = message {
                log::debug!("post-scf {calc} failure detail: {detail}");
            }
            ctx.append_event(self.run_id,
                              WorkflowEventKind::PostScfFailed { calc_type: calc.as_str().to_string(),
                                                                 exit_status,
                                                                 message: format!("[{}] {code}", code.status()) })?;
        }

        let mut named = vec![("scf", &scf_parameters)];
        named.extend(post_scf_parameters.iter().map(|(k, v)| (k.as_str(), v)));
        let all_parameters = merge_outputs(named);

        self.outputs = Some(WorkChainOutputs { scf_parameters,
                                               post_scf_parameters,
                                               all_parameters });
        self.report(ctx, "OlcaoBaseWorkChain completed successfully")
    }

    async fn step(&mut self, step: Step, engine: &dyn Engine, ctx: &mut PluginContext) -> Result<(), WorkflowError> {
        match step {
            Step::Setup => self.setup(ctx),
            Step::RunScf => self.run_scf(engine, ctx).await,
            Step::InspectScf => self.inspect_scf(ctx),
            Step::RunPostScf => self.run_post_scf(engine, ctx).await,
            Step::Results => self.results(ctx),
        }
    }
}

#[async_trait]
impl Workflow for OlcaoBaseWorkChain {
    fn entry_point(&self) -> &'static str {
        BASE_WORKFLOW_ENTRY_POINT
    }

    async fn run(&mut self, engine: &dyn Engine, ctx: &mut PluginContext) -> Result<Value, WorkflowError> {
        ctx.ensure_open()?;
        let fingerprint = serde_json::to_value(&self.inputs).map(|v| inputs_fingerprint(&v))
                                                            .unwrap_or_default();
        ctx.append_event(self.run_id,
                          WorkflowEventKind::RunInitialized { workflow: BASE_WORKFLOW_ENTRY_POINT.to_string(),
                                                              outline: Step::OUTLINE.iter()
                                                                                    .map(|s| s.as_str().to_string())
                                                                                    .collect(),
                                                              inputs_fingerprint: fingerprint })?;

        for (step_index, step) in Step::OUTLINE.into_iter().enumerate() {
            let step_id = step.as_str().to_string();
            ctx.append_event(self.run_id,
                              WorkflowEventKind::StepStarted { step_index,
                                                               step_id: step_id.clone() })?;
            if let Err(err) = self.step(step, engine, ctx).await {
                let exit_status = err.exit_code().map(WorkflowExitCode::status);
                log::warn!("[{}|{}] step {step_id} failed: {err}", BASE_WORKFLOW_ENTRY_POINT, self.run_id);
                ctx.append_event(self.run_id,
                                  WorkflowEventKind::StepFailed { step_index,
                                                                  step_id,
                                                                  exit_status,
                                                                  message: err.to_string() })?;
                if let Some(status) = exit_status {
                    ctx.append_event(self.run_id, WorkflowEventKind::RunCompleted { exit_status: status })?;
                }
                return Err(err);
            }
            ctx.append_event(self.run_id, WorkflowEventKind::StepFinished { step_index, step_id })?;
        }
        ctx.append_event(self.run_id, WorkflowEventKind::RunCompleted { exit_status: 0 })?;

        Ok(self.outputs
               .as_ref()
               .and_then(|o| serde_json::to_value(o).ok())
               .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_basis_uses_table() {
        assert_eq!(post_scf_basis(CalculationType::Bond, BasisSet::Full), BasisSet::Minimal);
        assert_eq!(post_scf_basis(CalculationType::Optc, BasisSet::Full), BasisSet::Extended);
        assert_eq!(post_scf_basis(CalculationType::Dos, BasisSet::Full), BasisSet::Full);
    }

    #[test]
    fn explicit_basis_is_kept() {
        assert_eq!(post_scf_basis(CalculationType::Bond, BasisSet::Extended), BasisSet::Extended);
        assert_eq!(post_scf_basis(CalculationType::Optc, BasisSet::Minimal), BasisSet::Minimal);
    }

    #[test]
    fn outline_order() {
        let ids: Vec<&str> = Step::OUTLINE.iter().map(Step::as_str).collect();
        assert_eq!(ids, ["setup", "run_scf", "inspect_scf", "run_post_scf", "results"]);
    }
}
