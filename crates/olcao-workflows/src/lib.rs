//! olcao-workflows: orquestación SCF → post-SCF sobre el trait `Engine`.

pub mod base;
pub mod inputs;
pub mod outputs;

pub use base::{post_scf_basis, OlcaoBaseWorkChain, Step};
pub use inputs::{BaseWorkChainInputs, WorkflowOptions};
pub use outputs::{merge_outputs, WorkChainOutputs};
