//! Engine local: corre cada calculación como un script bash en su propio
//! directorio, recupera archivos y aplica el parser registrado.
//!
//! No hay scheduler: `resources` y `max_wallclock_seconds` se guardan pero
//! no se imponen.
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use olcao_core::model::{CalcInfo, CalcInputs, RetrievedFolder, SandboxFolder};
use olcao_core::{CalcHandle, CalcNode, CalcRequest, Engine, EngineError, OutputParser, PluginRegistry, ProcessState};

use crate::error::InfraError;
use crate::record::{CalcRecord, CalcRecordStore};
use crate::retrieve::retrieve_files;

pub const SUBMIT_SCRIPT_NAME: &str = "_olcao_submit.sh";

/// Comillas simples POSIX.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Script bash: `prepend_text` y luego una línea por invocación.
pub fn render_script(info: &CalcInfo, executable: &Path) -> String {
    let mut script = String::from("#!/bin/bash\n");
    if let Some(prepend) = &info.prepend_text {
        script.push_str(prepend);
        if !prepend.ends_with('\n') {
            script.push('\n');
        }
    }
    for code in &info.codes_info {
        let mut line = shell_quote(&executable.to_string_lossy());
        for arg in &code.cmdline_params {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        if let Some(stdin) = &code.stdin_name {
            line.push_str(&format!(" < {}", shell_quote(stdin)));
        }
        if let Some(stdout) = &code.stdout_name {
            line.push_str(&format!(" > {}", shell_quote(stdout)));
        }
        script.push_str(&line);
        script.push('\n');
    }
    script
}

pub struct LocalEngine {
    registry: PluginRegistry,
    store: CalcRecordStore,
    running: Mutex<HashMap<Uuid, JoinHandle<CalcRecord>>>,
}

impl LocalEngine {
    pub fn new(registry: PluginRegistry, work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        Self { registry,
               store: CalcRecordStore::new(&work_dir),
               running: Mutex::new(HashMap::new()) }
    }

    pub fn store(&self) -> &CalcRecordStore {
        &self.store
    }

    fn prepare(&self, id: Uuid, request: &CalcRequest) -> Result<(CalcInfo, Box<dyn OutputParser>), EngineError> {
        let calc = self.registry.calculation(&request.process)?;
        let parser = self.registry.parser(&request.inputs.options.parser_name)?;
        let mut sandbox = SandboxFolder::new(self.store.work_dir(id))?;
        let info = calc.prepare_for_submission(&request.inputs, &mut sandbox)?;
        if let Some(code) = info.codes_info.iter().find(|c| c.code_uuid != request.inputs.code.uuid) {
            return Err(EngineError::Submission(format!("invocation bound to unknown code {}", code.code_uuid)));
        }
        let script = render_script(&info, &request.inputs.code.executable);
        std::fs::write(sandbox.path().join(SUBMIT_SCRIPT_NAME), script)?;
        Ok((info, parser))
    }
}

/// Ejecuta el script, recupera y parsea; el registro final queda guardado.
async fn execute(store: CalcRecordStore, mut record: CalcRecord, inputs: CalcInputs,
                 parser: Box<dyn OutputParser>)
                 -> CalcRecord {
    let work = store.work_dir(record.id);
    let options = &inputs.options;
    record.state = ProcessState::Running;
    record.mtime = Utc::now();
    if let Err(e) = store.save(&record) {
        log::warn!("calc {}: could not persist running state: {e}", record.id);
    }

    let status = match run_script(&work, &options.scheduler_stdout, &options.scheduler_stderr).await {
        Ok(status) => status,
        Err(e) => {
            log::error!("calc {}: could not launch: {e}", record.id);
            record.state = ProcessState::Excepted;
            record.exit_message = Some(format!("launch failed: {e}"));
            return finish(&store, record);
        }
    };
    if !status.success() {
        log::warn!("calc {} ({}): script exited with {status}", record.id, record.label);
    }

    let retrieved_dir = store.retrieved_dir(record.id);
    let outcome = match retrieve_files(&work, &retrieved_dir, &record.retrieve_list)
        .and_then(|_| RetrievedFolder::from_dir(&retrieved_dir))
    {
        Ok(folder) => parser.parse(Some(&folder)),
        Err(e) => {
            log::warn!("calc {}: retrieval failed: {e}", record.id);
            parser.parse(None)
        }
    };
    record.state = ProcessState::Finished;
    record.exit_status = Some(outcome.exit_status().unwrap_or(0));
    record.exit_message = outcome.exit_code.as_ref().map(|c| c.to_string());
    record.outputs = outcome.output_parameters;
    log::info!("calc {} ({}) finished with exit status {}",
               record.id,
               record.label,
               record.exit_status.unwrap_or(0));
    finish(&store, record)
}

async fn run_script(work: &Path, stdout: &str, stderr: &str) -> std::io::Result<std::process::ExitStatus> {
    let out = File::create(work.join(stdout))?;
    let err = File::create(work.join(stderr))?;
    tokio::process::Command::new("bash").arg(SUBMIT_SCRIPT_NAME)
                                        .current_dir(work)
                                        .stdin(Stdio::null())
                                        .stdout(Stdio::from(out))
                                        .stderr(Stdio::from(err))
                                        .status()
                                        .await
}

fn finish(store: &CalcRecordStore, mut record: CalcRecord) -> CalcRecord {
    record.mtime = Utc::now();
    if let Err(e) = store.save(&record) {
        log::warn!("calc {}: could not persist final state: {e}", record.id);
    }
    record
}

#[async_trait]
impl Engine for LocalEngine {
    async fn submit(&self, request: CalcRequest) -> Result<CalcHandle, EngineError> {
        let id = Uuid::new_v4();
        let (info, parser) = self.prepare(id, &request)?;

        let mut record = CalcRecord::new(id, request.process.clone(), request.label.clone());
        record.description = request.description.clone();
        record.retrieve_list = info.retrieve_list;
        self.store.save(&record)?;
        log::info!("submitted calc {id} ({}) [{}]", request.label, request.process);

        let store = self.store.clone();
        let task = tokio::spawn(execute(store, record, request.inputs, parser));
        self.running.lock().await.insert(id, task);
        Ok(CalcHandle { id,
                        label: request.label })
    }

    async fn wait(&self, handle: &CalcHandle) -> Result<CalcNode, EngineError> {
        let task = self.running.lock().await.remove(&handle.id);
        match task {
            Some(task) => {
                let record = task.await.map_err(|e| EngineError::Internal(format!("calc task failed: {e}")))?;
                Ok(record.to_node())
            }
            // ya esperada antes (o de otra corrida): el registro manda
            None => match self.store.load(handle.id) {
                Ok(record) => Ok(record.to_node()),
                Err(InfraError::NotFound(_)) => Err(EngineError::UnknownCalculation(handle.id)),
                Err(e) => Err(e.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olcao_core::model::{CodeInfo, RetrieveItem};

    #[test]
    fn script_binds_stdio_and_quotes_args() {
        let info = CalcInfo { codes_info: vec![CodeInfo { code_uuid: Uuid::new_v4(),
                                                          cmdline_params: vec!["-scf".into(), "FB".into()],
                                                          stdin_name: Some("olcao.in".into()),
                                                          stdout_name: Some("olcao.out".into()) }],
                              prepend_text: Some("source /x/olcaorc".into()),
                              retrieve_list: vec![RetrieveItem::from("olcao.out")] };
        let script = render_script(&info, Path::new("/opt/it's/uolcao"));
        assert_eq!(script,
                   "#!/bin/bash\nsource /x/olcaorc\n'/opt/it'\\''s/uolcao' '-scf' 'FB' < 'olcao.in' > 'olcao.out'\n");
    }
}
