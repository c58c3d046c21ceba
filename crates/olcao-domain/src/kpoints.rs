use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::ParameterError;

/// Malla de puntos k: tres enteros positivos.
///
/// El default (`1 1 1`) es la malla que se usa cuando ningún parámetro de
/// k-points está presente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u32>")]
pub struct KPointMesh([u32; 3]);

impl KPointMesh {
    pub fn new(a: u32, b: u32, c: u32) -> Result<Self, ParameterError> {
        Self::from_slice("kpoints", &[a as i64, b as i64, c as i64])
    }

    pub fn values(&self) -> [u32; 3] {
        self.0
    }

    /// Valida un valor JSON crudo bajo la clave `key` (para mensajes).
    pub fn from_value(key: &str, value: &Value) -> Result<Self, ParameterError> {
        let items = value.as_array()
                         .ok_or_else(|| ParameterError::KPointsNotList { key: key.to_string() })?;
        if items.len() != 3 {
            return Err(ParameterError::KPointsLength { key: key.to_string(),
                                                       found: items.len() });
        }
        let mut out = [0u32; 3];
        for (index, item) in items.iter().enumerate() {
            out[index] = item.as_u64()
                             .filter(|v| *v > 0)
                             .and_then(|v| u32::try_from(v).ok())
                             .ok_or_else(|| ParameterError::KPointNotPositive { key: key.to_string(),
                                                                                index,
                                                                                value: item.to_string() })?;
        }
        Ok(Self(out))
    }

    fn from_slice(key: &str, items: &[i64]) -> Result<Self, ParameterError> {
        let json: Vec<Value> = items.iter().map(|v| Value::from(*v)).collect();
        Self::from_value(key, &Value::Array(json))
    }
}

impl Default for KPointMesh {
    fn default() -> Self {
        Self([1, 1, 1])
    }
}

impl TryFrom<Vec<i64>> for KPointMesh {
    type Error = ParameterError;

    fn try_from(v: Vec<i64>) -> Result<Self, Self::Error> {
        Self::from_slice("kpoints", &v)
    }
}

impl From<KPointMesh> for Vec<u32> {
    fn from(mesh: KPointMesh) -> Self {
        mesh.0.to_vec()
    }
}

impl From<KPointMesh> for Value {
    fn from(mesh: KPointMesh) -> Self {
        Value::from(mesh.0.to_vec())
    }
}

impl fmt::Display for KPointMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.0[0], self.0[1], self.0[2])
    }
}
