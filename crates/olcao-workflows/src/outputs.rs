//! Salidas del workchain base y su fusión en un único mapa.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use olcao_core::model::OutputParameters;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkChainOutputs {
    pub scf_parameters: OutputParameters,
    /// Sólo las post-SCF que terminaron bien, en el orden pedido.
    pub post_scf_parameters: IndexMap<String, OutputParameters>,
    /// `{"scf": ..., "<tipo>": ...}`.
    pub all_parameters: Map<String, Value>,
}

/// Fusiona resultados nombrados en un mapa `{nombre: resultado}`.
pub fn merge_outputs<'a, I>(named: I) -> Map<String, Value>
    where I: IntoIterator<Item = (&'a str, &'a OutputParameters)>
{
    named.into_iter()
         .map(|(name, params)| (name.to_string(), Value::Object(params.to_map())))
         .collect()
}
