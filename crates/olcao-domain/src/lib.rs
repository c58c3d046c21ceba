// olcao-domain: parámetros OLCAO y su validación
mod choice;
pub mod error;
pub mod kpoints;
pub mod parameters;

pub use choice::{BasisSet, CalculationType, Edge};
pub use error::ParameterError;
pub use kpoints::KPointMesh;
pub use parameters::{OlcaoParameters, ParametersBuilder};
