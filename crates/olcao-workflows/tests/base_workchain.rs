use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use olcao_core::model::{Code, OutputParameters, ParsedOutput, SinglefileData};
use olcao_core::{CalcHandle, CalcNode, CalcRequest, Engine, EngineError, OlcaoConfig, PluginContext, PluginRegistry,
                 ProcessState, Workflow, WorkflowError, WorkflowEventKind, WorkflowExitCode};
use olcao_domain::{BasisSet, KPointMesh, OlcaoParameters};
use olcao_workflows::{BaseWorkChainInputs, OlcaoBaseWorkChain};

/// Resultado guionado por label de calculación.
#[derive(Clone)]
struct Script {
    exit_status: Option<u32>,
    outputs: Option<OutputParameters>,
}

impl Script {
    fn ok(parsed: ParsedOutput) -> Self {
        Self { exit_status: Some(0),
               outputs: Some(OutputParameters { parsed,
                                                ..Default::default() }) }
    }

    fn failed(status: u32) -> Self {
        Self { exit_status: Some(status),
               outputs: None }
    }
}

#[derive(Default)]
struct ScriptedEngine {
    scripts: HashMap<String, Script>,
    /// Labels cuyo `submit` falla.
    rejected: Vec<String>,
    /// Labels cuyo `wait` falla.
    lost: Vec<String>,
    submitted: Mutex<Vec<CalcRequest>>,
    /// Secuencia `submit:<label>` / `wait:<label>`.
    trace: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    fn with(mut self, label: &str, script: Script) -> Self {
        self.scripts.insert(label.to_string(), script);
        self
    }

    fn rejecting(mut self, label: &str) -> Self {
        self.rejected.push(label.to_string());
        self
    }

    fn losing(mut self, label: &str) -> Self {
        self.lost.push(label.to_string());
        self
    }

    fn submitted_labels(&self) -> Vec<String> {
        self.submitted.lock().unwrap().iter().map(|r| r.label.clone()).collect()
    }

    fn params_for(&self, label: &str) -> OlcaoParameters {
        let submitted = self.submitted.lock().unwrap();
        let req = submitted.iter().find(|r| r.label == label).unwrap();
        req.inputs.parameters.clone().unwrap()
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    async fn submit(&self, request: CalcRequest) -> Result<CalcHandle, EngineError> {
        let id = Uuid::new_v4();
        self.trace.lock().unwrap().push(format!("submit:{}", request.label));
        if self.rejected.contains(&request.label) {
            return Err(EngineError::Submission(format!("queue refused {}", request.label)));
        }
        let label = request.label.clone();
        self.submitted.lock().unwrap().push(request);
        Ok(CalcHandle { id, label })
    }

    async fn wait(&self, handle: &CalcHandle) -> Result<CalcNode, EngineError> {
        self.trace.lock().unwrap().push(format!("wait:{}", handle.label));
        if self.lost.contains(&handle.label) {
            return Err(EngineError::UnknownCalculation(handle.id));
        }
        let script = self.scripts
                         .get(&handle.label)
                         .cloned()
                         .unwrap_or_else(|| Script::ok(ParsedOutput::default()));
        Ok(CalcNode { id: handle.id,
                      label: handle.label.clone(),
                      state: ProcessState::Finished,
                      exit_status: script.exit_status,
                      exit_message: None,
                      outputs: script.outputs,
                      ctime: Utc::now() })
    }
}

fn converged_scf() -> Script {
    Script::ok(ParsedOutput { total_energy: Some(-75.5),
                              fermi_energy: Some(0.25),
                              converged: Some(true),
                              ..Default::default() })
}

fn inputs(calcs: &[&str]) -> BaseWorkChainInputs {
    BaseWorkChainInputs::new(Code::new("uolcao", "/opt/olcao/bin/uolcao"),
                             SinglefileData::new("diamond.skl", "title\ndiamond\nend\n"),
                             KPointMesh::new(5, 5, 5).unwrap()).calculations(calcs.iter().copied())
}

fn context() -> PluginContext {
    PluginContext::open(OlcaoConfig::default(), PluginRegistry::new())
}

fn exit_status(err: &WorkflowError) -> u32 {
    err.exit_code().map(WorkflowExitCode::status).unwrap()
}

fn post_scf_failures(ctx: &PluginContext, run_id: Uuid) -> Vec<(String, Option<u32>, String)> {
    ctx.events(run_id)
       .iter()
       .filter_map(|e| match &e.kind {
           WorkflowEventKind::PostScfFailed { calc_type, exit_status, message } => {
               Some((calc_type.clone(), *exit_status, message.clone()))
           }
           _ => None,
       })
       .collect()
}

#[tokio::test]
async fn scf_then_post_scf_collects_outputs() {
    let engine = ScriptedEngine::default().with("scf", converged_scf())
                                          .with("dos", Script::ok(ParsedOutput { band_gap: Some(5.4),
                                                                                 ..Default::default() }));
    let mut ctx = context();
    let mut wc = OlcaoBaseWorkChain::new(inputs(&["dos", "bond"]));
    let value = wc.run(&engine, &mut ctx).await.unwrap();

    assert_eq!(engine.submitted_labels(), vec!["scf", "dos", "bond"]);
    let trace = engine.trace.lock().unwrap().clone();
    assert_eq!(&trace[..4], ["submit:scf", "wait:scf", "submit:dos", "submit:bond"]);
    assert_eq!(trace.len(), 6);
    assert_eq!(wc.scf_energies(), (Some(-75.5), Some(0.25)));

    let out = wc.outputs().unwrap();
    assert_eq!(out.scf_parameters.parsed.total_energy, Some(-75.5));
    assert_eq!(out.post_scf_parameters.keys().collect::<Vec<_>>(), vec!["dos", "bond"]);
    assert_eq!(out.all_parameters["scf"]["converged"], true);
    assert_eq!(out.all_parameters["dos"]["band_gap"], 5.4);
    assert_eq!(value["scf_parameters"]["total_energy"], -75.5);

    let events = ctx.events(wc.run_id());
    assert!(matches!(events.first().map(|e| &e.kind), Some(WorkflowEventKind::RunInitialized { .. })));
    assert!(matches!(events.last().map(|e| &e.kind), Some(WorkflowEventKind::RunCompleted { exit_status: 0 })));
    let submitted = events.iter()
                          .filter(|e| matches!(e.kind, WorkflowEventKind::CalculationSubmitted { .. }))
                          .count();
    assert_eq!(submitted, 3);
}

#[tokio::test]
async fn scf_request_shape() {
    let engine = ScriptedEngine::default().with("scf", converged_scf());
    let mut wc = OlcaoBaseWorkChain::new(inputs(&[]));
    wc.run(&engine, &mut context()).await.unwrap();

    assert_eq!(engine.submitted_labels(), vec!["scf"]);
    let scf = engine.params_for("scf");
    assert_eq!(scf.get_uolcao_cmdline().unwrap(), "-scf FB");
    assert_eq!(scf.get_makeinput_cmdline().unwrap(), "-kp 5 5 5");
    let submitted = engine.submitted.lock().unwrap();
    assert_eq!(submitted[0].process, "olcao");
    assert_eq!(submitted[0].inputs.options.max_wallclock_seconds, 3600);
    assert!(wc.outputs().unwrap().post_scf_parameters.is_empty());
}

#[tokio::test]
async fn invalid_type_exits_401_before_submitting() {
    let engine = ScriptedEngine::default();
    let mut ctx = context();
    let mut wc = OlcaoBaseWorkChain::new(inputs(&["dos", "scf"]));
    let err = wc.run(&engine, &mut ctx).await.unwrap_err();
    assert_eq!(exit_status(&err), 401);
    assert!(err.to_string().contains("Invalid calculation type requested: scf"));
    assert!(engine.submitted_labels().is_empty());

    let events = ctx.events(wc.run_id());
    assert!(events.iter().any(|e| matches!(&e.kind,
                                           WorkflowEventKind::StepFailed { step_id, exit_status: Some(401), .. }
                                           if step_id == "setup")));
}

#[tokio::test]
async fn scf_exit_302_maps_to_402() {
    let engine = ScriptedEngine::default().with("scf", Script::failed(302));
    let err = OlcaoBaseWorkChain::new(inputs(&["dos"])).run(&engine, &mut context()).await.unwrap_err();
    assert_eq!(exit_status(&err), 402);
    assert_eq!(engine.submitted_labels(), vec!["scf"]);
}

#[tokio::test]
async fn other_scf_failures_map_to_403() {
    let engine = ScriptedEngine::default().with("scf", Script::failed(303));
    let err = OlcaoBaseWorkChain::new(inputs(&["dos"])).run(&engine, &mut context()).await.unwrap_err();
    assert_eq!(exit_status(&err), 403);
    assert!(err.to_string().contains("failed with exit code 303"));
}

#[tokio::test]
async fn unconverged_output_maps_to_402() {
    let engine = ScriptedEngine::default().with("scf",
                                                Script::ok(ParsedOutput { converged: Some(false),
                                                                          ..Default::default() }));
    let err = OlcaoBaseWorkChain::new(inputs(&["dos"])).run(&engine, &mut context()).await.unwrap_err();
    assert_eq!(exit_status(&err), 402);
}

#[tokio::test]
async fn failed_post_scf_is_reported_not_fatal() {
    let engine = ScriptedEngine::default().with("scf", converged_scf())
                                          .with("optc", Script::failed(301));
    let mut ctx = context();
    let mut wc = OlcaoBaseWorkChain::new(inputs(&["dos", "optc"]));
    wc.run(&engine, &mut ctx).await.unwrap();

    let out = wc.outputs().unwrap();
    assert!(out.post_scf_parameters.contains_key("dos"));
    assert!(!out.post_scf_parameters.contains_key("optc"));
    assert!(!out.all_parameters.contains_key("optc"));

    let events = ctx.events(wc.run_id());
    let failure = events.iter().find_map(|e| match &e.kind {
                                   WorkflowEventKind::PostScfFailed { calc_type, exit_status, message } => {
                                       Some((calc_type.clone(), *exit_status, message.clone()))
                                   }
                                   _ => None,
                               });
    let (calc_type, status, message) = failure.unwrap();
    assert_eq!(calc_type, "optc");
    assert_eq!(status, Some(301));
    assert!(message.starts_with("[404]"));
}

#[tokio::test]
async fn default_basis_uses_table_explicit_overrides() {
    let engine = ScriptedEngine::default().with("scf", converged_scf());
    OlcaoBaseWorkChain::new(inputs(&["bond", "optc", "dos"])).run(&engine, &mut context())
                                                            .await
                                                            .unwrap();
    assert_eq!(engine.params_for("bond").basis_pscf().unwrap(), BasisSet::Minimal);
    assert_eq!(engine.params_for("optc").basis_pscf().unwrap(), BasisSet::Extended);
    assert_eq!(engine.params_for("dos").basis_pscf().unwrap(), BasisSet::Full);
    assert_eq!(engine.params_for("bond").get_uolcao_cmdline().unwrap(), "-bond");

    let engine = ScriptedEngine::default().with("scf", converged_scf());
    let mut explicit = inputs(&["bond"]);
    explicit.basis_pscf = BasisSet::Extended;
    OlcaoBaseWorkChain::new(explicit).run(&engine, &mut context()).await.unwrap();
    assert_eq!(engine.params_for("bond").basis_pscf().unwrap(), BasisSet::Extended);
}

#[tokio::test]
async fn closed_context_is_rejected() {
    let engine = ScriptedEngine::default();
    let mut ctx = context();
    ctx.close().unwrap();
    let err = OlcaoBaseWorkChain::new(inputs(&["dos"])).run(&engine, &mut ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Context(_)));
    assert!(engine.submitted_labels().is_empty());
}

#[tokio::test]
async fn rejected_post_scf_submission_is_not_fatal() {
    let engine = ScriptedEngine::default().with("scf", converged_scf())
                                          .with("bond", Script::ok(ParsedOutput { num_atoms: Some(8),
                                                                                  ..Default::default() }))
                                          .rejecting("dos");
    let mut ctx = context();
    let mut wc = OlcaoBaseWorkChain::new(inputs(&["dos", "bond"]));
    wc.run(&engine, &mut ctx).await.unwrap();

    // bond se envía y se espera aunque dos haya sido rechazado
    assert_eq!(engine.submitted_labels(), vec!["scf", "bond"]);
    let trace = engine.trace.lock().unwrap().clone();
    assert_eq!(trace, ["submit:scf", "wait:scf", "submit:dos", "submit:bond", "wait:bond"]);

    let out = wc.outputs().unwrap();
    assert_eq!(out.post_scf_parameters.keys().collect::<Vec<_>>(), vec!["bond"]);
    assert_eq!(out.all_parameters["bond"]["num_atoms"], 8);

    let failures = post_scf_failures(&ctx, wc.run_id());
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "dos");
    assert_eq!(failures[0].1, None);
    assert!(failures[0].2.starts_with("[404]"));
    let events = ctx.events(wc.run_id());
    assert!(matches!(events.last().map(|e| &e.kind), Some(WorkflowEventKind::RunCompleted { exit_status: 0 })));
}

#[tokio::test]
async fn lost_post_scf_node_is_not_fatal() {
    let engine = ScriptedEngine::default().with("scf", converged_scf())
                                          .losing("optc");
    let mut ctx = context();
    let mut wc = OlcaoBaseWorkChain::new(inputs(&["optc", "dos"]));
    wc.run(&engine, &mut ctx).await.unwrap();

    assert_eq!(engine.submitted_labels(), vec!["scf", "optc", "dos"]);
    let out = wc.outputs().unwrap();
    assert_eq!(out.post_scf_parameters.keys().collect::<Vec<_>>(), vec!["dos"]);

    let failures = post_scf_failures(&ctx, wc.run_id());
    assert_eq!(failures.len(), 1);
    assert_eq!((failures[0].0.as_str(), failures[0].1), ("optc", None));
}
