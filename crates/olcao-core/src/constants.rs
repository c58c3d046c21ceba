//! Constantes del plugin.
//!
//! Nombres de archivo dentro del sandbox y convenciones de los archivos
//! recuperados. Cambiarlos rompe la compatibilidad con corridas previas.

/// Versión lógica del plugin. Entra en el fingerprint de las entradas.
pub const PLUGIN_VERSION: &str = "olcao-0.1";

/// Entry point de la calculación, el parser y los datos.
pub const ENTRY_POINT: &str = "olcao";
/// Entry point del workflow base (SCF + post-SCF).
pub const BASE_WORKFLOW_ENTRY_POINT: &str = "olcao.base";

pub const DEFAULT_INPUT_FILENAME: &str = "olcao.in";
pub const DEFAULT_OUTPUT_FILENAME: &str = "olcao.out";
/// Nombre con el que se deposita el esqueleto (`.skl`) para `makeinput`.
pub const SKELETON_FILENAME: &str = "olcao.skl";

pub const DEFAULT_SCHEDULER_STDOUT: &str = "_scheduler-stdout.txt";
pub const DEFAULT_SCHEDULER_STDERR: &str = "_scheduler-stderr.txt";

/// Patrón glob de los outputs principales de `uolcao` (p.ej. `gs_scf-fb.out`).
pub const OUTPUT_FILE_PATTERN: &str = "gs_*-*.out";
pub const SUMMARY_FILENAME: &str = "summary";
/// Marcador que deja `makeinput` cuando sí generó entradas.
pub const OLCAO_DAT_FILENAME: &str = "olcao.dat";

pub const DEFAULT_OLCAO_RC: &str = "$HOME/.olcao/olcaorc";
pub const DEFAULT_MAKEINPUT_PATH: &str = "makeinput";
pub const DEFAULT_MAX_WALLCLOCK_SECONDS: u64 = 3600;

/// Exit status con el que la calculación reporta falta de convergencia SCF.
pub const EXIT_STATUS_NOT_CONVERGED: u32 = 302;

/// Longitud máxima (en caracteres) del extracto de error.
pub const ERROR_EXCERPT_MAX_CHARS: usize = 500;
