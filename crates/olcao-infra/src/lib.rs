//! olcao-infra: engine local sobre `tokio::process` y registro en disco de
//! las calculaciones.

pub mod error;
pub mod local;
pub mod record;
pub mod retrieve;

pub use error::InfraError;
pub use local::LocalEngine;
pub use record::{CalcRecord, CalcRecordStore};
