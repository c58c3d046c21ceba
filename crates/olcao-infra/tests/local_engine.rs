#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use olcao_adapters::{OlcaoCalculation, OlcaoParser};
use olcao_core::model::{CalcInputs, CalcOptions, Code, SinglefileData};
use olcao_core::{CalcJob, CalcRequest, Engine, EngineError, OutputParser, PluginRegistry, ProcessState, RegistryError};
use olcao_domain::{KPointMesh, OlcaoParameters};
use olcao_infra::LocalEngine;

fn registry() -> PluginRegistry {
    let mut reg = PluginRegistry::new();
    reg.register_calculation("olcao", || Box::new(OlcaoCalculation) as Box<dyn CalcJob>).unwrap();
    reg.register_parser("olcao", || Box::new(OlcaoParser) as Box<dyn OutputParser>).unwrap();
    reg
}

fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn input_file_mode_runs_and_parses() {
    let bin = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    // uolcao falso: eco de la entrada y un output convergido
    let uolcao = write_executable(bin.path(),
                                  "uolcao",
                                  "cat\nprintf 'TOTAL ENERGY = -12.5\\nSCF converged\\n' > gs_scf-fb.out\n");
    let engine = LocalEngine::new(registry(), work.path());
    let options = CalcOptions::from_value(serde_json::json!({"additional_retrieve_list": ["gs_*-*.out"]})).unwrap();
    let inputs = CalcInputs::with_input_file(Code::new("uolcao", &uolcao), SinglefileData::new("in", "hello\n")).options(options);

    let handle = engine.submit(CalcRequest::new("olcao", inputs, "scf")).await.unwrap();
    let node = engine.wait(&handle).await.unwrap();
    assert_eq!(node.state, ProcessState::Finished);
    assert!(node.is_finished_ok(), "{node:?}");
    let out = node.outputs.unwrap();
    assert_eq!(out.parsed.total_energy, Some(-12.5));
    assert_eq!(out.retrieved_files, vec!["gs_scf-fb.out", "olcao.out"]);

    let retrieved = engine.store().retrieved_dir(handle.id);
    assert_eq!(fs::read_to_string(retrieved.join("olcao.out")).unwrap(), "hello\n");

    // una segunda espera lee el registro persistido
    let again = engine.wait(&handle).await.unwrap();
    assert_eq!(again.exit_status, Some(0));
    assert_eq!(engine.store().list(10, None).unwrap().len(), 1);
}

#[tokio::test]
async fn unreadable_scratch_entries_do_not_break_retrieval() {
    let bin = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let rc = bin.path().join("olcaorc");
    fs::write(&rc, "").unwrap();
    let makeinput = write_executable(bin.path(), "makeinput", "echo \"$@\" > olcao.dat\n");
    let uolcao = write_executable(bin.path(),
                                  "uolcao",
                                  "printf 'TOTAL ENERGY = -3.5\\nSCF converged\\n' > gs_scf-fb.out\n\
                                   ln -s /nonexistent/scratch stale_link\n\
                                   ln -s /nonexistent/tmp \"$OLCAO_TEMP/fort.8\"\n");
    let engine = LocalEngine::new(registry(), work.path());
    let inputs = CalcInputs::with_skeleton(Code::new("uolcao", &uolcao),
                                           SinglefileData::new("diamond.skl", "title\n"),
                                           rc.to_string_lossy(),
                                           makeinput.to_string_lossy());

    let handle = engine.submit(CalcRequest::new("olcao", inputs, "scf")).await.unwrap();
    let node = engine.wait(&handle).await.unwrap();
    assert_eq!(node.exit_status, Some(0), "{node:?}");
    let out = node.outputs.unwrap();
    assert_eq!(out.parsed.total_energy, Some(-3.5));
    assert_eq!(out.parsed.converged, Some(true));
    assert!(out.retrieved_files.contains(&"gs_scf-fb.out".to_string()));
}

#[tokio::test]
async fn skeleton_mode_runs_makeinput_then_code() {
    let bin = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let rc = bin.path().join("olcaorc");
    fs::write(&rc, "export OLCAO_TEST=1\n").unwrap();
    let makeinput = write_executable(bin.path(), "makeinput", "test -f olcao.skl && echo \"$@\" > olcao.dat\n");
    let uolcao = write_executable(bin.path(),
                                  "uolcao",
                                  "printf 'ITERATION 4\\nNOT CONVERGED\\n' > gs_scf-fb.out\nprintf 'BAND GAP = 1.5\\n' > summary\n");
    let engine = LocalEngine::new(registry(), work.path());
    let params = OlcaoParameters::builder().kpoints(KPointMesh::new(2, 2, 2).unwrap()).build();
    let inputs = CalcInputs::with_skeleton(Code::new("uolcao", &uolcao),
                                           SinglefileData::new("diamond.skl", "title\n"),
                                           rc.to_string_lossy(),
                                           makeinput.to_string_lossy()).parameters(params);

    let handle = engine.submit(CalcRequest::new("olcao", inputs, "scf")).await.unwrap();
    let node = engine.wait(&handle).await.unwrap();
    assert_eq!(node.exit_status, Some(302));
    let out = node.outputs.unwrap();
    assert_eq!(out.parsed.num_iterations, Some(4));
    assert_eq!(out.parsed.band_gap, Some(1.5));
    let dat = engine.store().retrieved_dir(handle.id).join("olcao.dat");
    assert_eq!(fs::read_to_string(dat).unwrap().trim(), "-kp 2 2 2");
}

#[tokio::test]
async fn missing_outputs_mean_makeinput_failed() {
    let work = tempfile::tempdir().unwrap();
    let engine = LocalEngine::new(registry(), work.path());
    let inputs = CalcInputs::with_input_file(Code::new("uolcao", "/bin/true"), SinglefileData::new("in", "x"));
    let handle = engine.submit(CalcRequest::new("olcao", inputs, "scf")).await.unwrap();
    let node = engine.wait(&handle).await.unwrap();
    assert_eq!(node.exit_status, Some(304));
    assert!(!node.is_finished_ok());
}

#[tokio::test]
async fn unknown_process_is_a_registry_error() {
    let work = tempfile::tempdir().unwrap();
    let engine = LocalEngine::new(registry(), work.path());
    let inputs = CalcInputs::with_input_file(Code::new("uolcao", "/bin/true"), SinglefileData::new("in", "x"));
    let err = engine.submit(CalcRequest::new("vasp", inputs, "scf")).await.unwrap_err();
    assert!(matches!(err, EngineError::Registry(RegistryError::Unregistered { .. })));
}
