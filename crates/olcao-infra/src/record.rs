//! Registro persistente de calculaciones del engine local.
//!
//! Layout en disco:
//! ```text
//! <work_dir>/calcs/<uuid>/
//!     record.json   estado, exit status y salidas parseadas
//!     work/         sandbox donde corre la calculación
//!     retrieved/    archivos recuperados
//! ```
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use olcao_core::model::{OutputParameters, RetrieveItem};
use olcao_core::{CalcNode, ProcessState};

use crate::error::InfraError;

const RECORD_FILENAME: &str = "record.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcRecord {
    pub id: Uuid,
    pub process: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: ProcessState,
    #[serde(default)]
    pub exit_status: Option<u32>,
    #[serde(default)]
    pub exit_message: Option<String>,
    #[serde(default)]
    pub outputs: Option<OutputParameters>,
    #[serde(default)]
    pub retrieve_list: Vec<RetrieveItem>,
    pub ctime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
}

impl CalcRecord {
    pub fn new(id: Uuid, process: impl Into<String>, label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self { id,
               process: process.into(),
               label: label.into(),
               description: None,
               state: ProcessState::Created,
               exit_status: None,
               exit_message: None,
               outputs: None,
               retrieve_list: Vec::new(),
               ctime: now,
               mtime: now }
    }

    pub fn to_node(&self) -> CalcNode {
        CalcNode { id: self.id,
                   label: self.label.clone(),
                   state: self.state,
                   exit_status: self.exit_status,
                   exit_message: self.exit_message.clone(),
                   outputs: self.outputs.clone(),
                   ctime: self.ctime }
    }
}

#[derive(Debug, Clone)]
pub struct CalcRecordStore {
    root: PathBuf,
}

impl CalcRecordStore {
    /// Store bajo `<work_dir>/calcs`.
    pub fn new(work_dir: &Path) -> Self {
        Self { root: work_dir.join("calcs") }
    }

    pub fn calc_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    pub fn work_dir(&self, id: Uuid) -> PathBuf {
        self.calc_dir(id).join("work")
    }

    pub fn retrieved_dir(&self, id: Uuid) -> PathBuf {
        self.calc_dir(id).join("retrieved")
    }

    pub fn save(&self, record: &CalcRecord) -> Result<(), InfraError> {
        let dir = self.calc_dir(record.id);
        fs::create_dir_all(&dir)?;
        let tmp = dir.join(format!("{RECORD_FILENAME}.tmp"));
        fs::write(&tmp, serde_json::to_vec_pretty(record)?)?;
        fs::rename(tmp, dir.join(RECORD_FILENAME))?;
        Ok(())
    }

    pub fn load(&self, id: Uuid) -> Result<CalcRecord, InfraError> {
        let path = self.calc_dir(id).join(RECORD_FILENAME);
        if !path.exists() {
            return Err(InfraError::NotFound(id.to_string()));
        }
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }

    /// Todos los registros legibles; los corruptos se saltan con un warning.
    pub fn all(&self) -> Result<Vec<CalcRecord>, InfraError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let Ok(id) = entry.file_name().to_string_lossy().parse::<Uuid>() else {
                continue;
            };
            match self.load(id) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("skipping calculation {id}: {e}"),
            }
        }
        Ok(records)
    }

    /// Más recientes primero; `past_days` filtra por `ctime`.
    pub fn list(&self, limit: usize, past_days: Option<i64>) -> Result<Vec<CalcRecord>, InfraError> {
        let cutoff = past_days.map(|d| {
                                  TimeDelta::try_days(d).and_then(|span| Utc::now().checked_sub_signed(span))
                                                        .ok_or(InfraError::TimeWindow(d))
                              })
                              .transpose()?;
        let mut records: Vec<CalcRecord> = self.all()?
                                               .into_iter()
                                               .filter(|r| cutoff.map_or(true, |c| r.ctime >= c))
                                               .collect();
        records.sort_by(|a, b| b.ctime.cmp(&a.ctime));
        records.truncate(limit);
        Ok(records)
    }

    /// Busca por UUID completo o prefijo único.
    pub fn find(&self, id_or_prefix: &str) -> Result<CalcRecord, InfraError> {
        if let Ok(id) = id_or_prefix.parse::<Uuid>() {
            return self.load(id);
        }
        let prefix = id_or_prefix.to_lowercase();
        let mut matches: Vec<CalcRecord> = self.all()?
                                               .into_iter()
                                               .filter(|r| r.id.to_string().starts_with(&prefix))
                                               .collect();
        match matches.len() {
            0 => Err(InfraError::NotFound(id_or_prefix.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(InfraError::Ambiguous { prefix: id_or_prefix.to_string(),
                                             matches: n }),
        }
    }
}
