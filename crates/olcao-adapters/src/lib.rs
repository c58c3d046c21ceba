//! olcao-adapters: implementaciones OLCAO de los contratos del core.
//!
//! - `calculation`: `OlcaoCalculation` (`CalcJob`), entrada por stdin o
//!   esqueleto + `makeinput`.
//! - `parser`: extracción por regex y `OlcaoParser` (`OutputParser`).

pub mod calculation;
pub mod parser;

pub use calculation::OlcaoCalculation;
pub use parser::{parse_olcao_output, OlcaoParser};
