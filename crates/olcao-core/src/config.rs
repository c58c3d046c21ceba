//! Configuración del plugin desde variables de entorno.
//!
//! Variables reconocidas (todas opcionales):
//! - `OLCAO_RC`: archivo `olcaorc` que se hace `source` en modo esqueleto.
//! - `OLCAO_MAKEINPUT_PATH`: ejecutable `makeinput`.
//! - `OLCAO_WORK_DIR`: raíz del engine local (`<work_dir>/calcs/<uuid>`).
//! - `OLCAO_MAX_WALLCLOCK_SECONDS`, `OLCAO_NUM_MACHINES`,
//!   `OLCAO_NUM_MPIPROCS_PER_MACHINE`: opciones por defecto del envío.
//!
//! Números mal formados o fuera de rango caen al valor por defecto.

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_MAKEINPUT_PATH, DEFAULT_MAX_WALLCLOCK_SECONDS, DEFAULT_OLCAO_RC};
use crate::model::Resources;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const DEFAULT_WORK_DIR: &str = ".olcao-work";

#[derive(Debug, Clone, PartialEq)]
pub struct OlcaoConfig {
    pub olcao_rc: String,
    pub makeinput_path: String,
    pub work_dir: PathBuf,
    pub resources: Resources,
    pub max_wallclock_seconds: u64,
}

impl Default for OlcaoConfig {
    fn default() -> Self {
        Self { olcao_rc: DEFAULT_OLCAO_RC.to_string(),
               makeinput_path: DEFAULT_MAKEINPUT_PATH.to_string(),
               work_dir: PathBuf::from(DEFAULT_WORK_DIR),
               resources: Resources::default(),
               max_wallclock_seconds: DEFAULT_MAX_WALLCLOCK_SECONDS }
    }
}

impl OlcaoConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str, default: u64| lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default);
        let count = |key: &str, default: u32| match u32::try_from(number(key, u64::from(default))) {
            Ok(value) => value,
            Err(_) => {
                log::warn!("{key} out of range, using {default}");
                default
            }
        };
        let resources = Resources { num_machines: count("OLCAO_NUM_MACHINES", defaults.resources.num_machines),
                                    num_mpiprocs_per_machine: count("OLCAO_NUM_MPIPROCS_PER_MACHINE",
                                                                    defaults.resources.num_mpiprocs_per_machine) };
        Self { olcao_rc: lookup("OLCAO_RC").unwrap_or(defaults.olcao_rc),
               makeinput_path: lookup("OLCAO_MAKEINPUT_PATH").unwrap_or(defaults.makeinput_path),
               work_dir: lookup("OLCAO_WORK_DIR").map(PathBuf::from).unwrap_or(defaults.work_dir),
               resources,
               max_wallclock_seconds: number("OLCAO_MAX_WALLCLOCK_SECONDS", defaults.max_wallclock_seconds) }
    }
}
