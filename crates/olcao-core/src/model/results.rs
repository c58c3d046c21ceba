//! Mapa de resultados parseados.
//!
//! Los campos ausentes son `None` y no se serializan: el JSON resultante
//! contiene sólo las claves encontradas. Ausente significa "no encontrado",
//! nunca cero.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Campos extraídos del texto de un output OLCAO.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_energy_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fermi_energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fermi_energy_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_atoms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_electrons: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_iterations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_gap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_gap_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ParsedOutput {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Completa sólo los campos ausentes con los de `other`.
    pub fn fill_missing_from(&mut self, other: ParsedOutput) {
        macro_rules! fill {
            ($($field:ident),+) => {
                $(if self.$field.is_none() { self.$field = other.$field; })+
            };
        }
        fill!(total_energy,
              total_energy_units,
              fermi_energy,
              fermi_energy_units,
              num_atoms,
              num_electrons,
              num_iterations,
              converged,
              band_gap,
              band_gap_units,
              has_error,
              error_message);
    }
}

/// Resultado completo de parsear una carpeta recuperada.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputParameters {
    #[serde(default)]
    pub retrieved_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parser_warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser_error: Option<String>,
    #[serde(flatten)]
    pub parsed: ParsedOutput,
}

impl OutputParameters {
    pub fn converged(&self) -> Option<bool> {
        self.parsed.converged
    }

    /// Vista como mapa JSON plano.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
