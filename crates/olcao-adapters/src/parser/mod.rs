//! Parser de outputs OLCAO: regex sobre texto + selección del archivo
//! principal y exit code sobre la carpeta recuperada.

pub mod retrieved;
pub mod text;

pub use retrieved::{find_output_files, OlcaoParser};
pub use text::parse_olcao_output;
