//! Hash helpers sobre blake3.

use blake3::Hasher;
use serde_json::Value;

use super::to_canonical_json;
use crate::constants::PLUGIN_VERSION;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Fingerprint estable de un conjunto de entradas: versión del plugin +
/// JSON canónico.
pub fn inputs_fingerprint(inputs: &Value) -> String {
    hash_str(&format!("{PLUGIN_VERSION}:{}", to_canonical_json(inputs)))
}
