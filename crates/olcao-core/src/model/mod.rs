//! Modelos neutrales (Code, archivos, carpetas, CalcInfo, resultados,...)

pub mod calc;
pub mod code;
pub mod file;
pub mod folder;
pub mod results;

pub use calc::{CalcInfo, CalcInput, CalcInputs, CalcOptions, CodeInfo, Resources, RetrieveItem};
pub use code::Code;
pub use file::SinglefileData;
pub use folder::{RetrievedFolder, SandboxFolder};
pub use results::{OutputParameters, ParsedOutput};
