//! Subcomandos del binario `olcao`.

pub mod export;
pub mod list;
pub mod parse;
pub mod run;
pub mod validate;
