//! Conjunto de parámetros OLCAO y generación de líneas de comando.
//!
//! `OlcaoParameters` guarda el mapa plano clave/valor tal como lo entrega el
//! usuario (JSON) y expone:
//! - `validate()`: verifica cada clave reconocida contra su dominio, en orden
//!   fijo, y falla en la primera violación.
//! - `get_makeinput_cmdline()`: fragmento para `makeinput` (mallas k).
//! - `get_uolcao_cmdline()`: fragmento para `uolcao` (tipo de cálculo).
//!
//! La ausencia de una clave siempre es legal; los defaults se aplican al leer.
//! No hay mutadores: una vez construido, el conjunto no cambia.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::{BasisSet, CalculationType, Edge, KPointMesh, ParameterError};

pub const KPOINTS: &str = "kpoints";
pub const KPOINTS_SCF: &str = "kpoints_scf";
pub const KPOINTS_PSCF: &str = "kpoints_pscf";
pub const CALCULATION_TYPE: &str = "calculation_type";
pub const BASIS_SCF: &str = "basis_scf";
pub const BASIS_PSCF: &str = "basis_pscf";
pub const EDGE: &str = "edge";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OlcaoParameters {
    values: Map<String, Value>,
}

impl OlcaoParameters {
    /// Envuelve el mapa sin validar (equivalente a crear el nodo de datos).
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Construye y valida.
    pub fn try_new(values: Map<String, Value>) -> Result<Self, ParameterError> {
        let params = Self::new(values);
        params.validate()?;
        Ok(params)
    }

    /// Construye desde un valor JSON arbitrario; debe ser un objeto.
    pub fn from_value(value: Value) -> Result<Self, ParameterError> {
        match value {
            Value::Object(map) => Self::try_new(map),
            _ => Err(ParameterError::NotAnObject),
        }
    }

    pub fn builder() -> ParametersBuilder {
        ParametersBuilder::default()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Valor crudo; `null` cuenta como ausente.
    fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        for key in [KPOINTS, KPOINTS_SCF, KPOINTS_PSCF] {
            self.kpoint_mesh(key)?;
        }
        self.calculation_type()?;
        self.basis_scf()?;
        self.basis_pscf()?;
        self.edge()?;
        Ok(())
    }

    /// Malla bajo `key`, `None` si la clave no está.
    pub fn kpoint_mesh(&self, key: &str) -> Result<Option<KPointMesh>, ParameterError> {
        self.raw(key).map(|v| KPointMesh::from_value(key, v)).transpose()
    }

    pub fn calculation_type(&self) -> Result<CalculationType, ParameterError> {
        self.choice(CALCULATION_TYPE)
    }

    pub fn basis_scf(&self) -> Result<BasisSet, ParameterError> {
        self.choice(BASIS_SCF)
    }

    pub fn basis_pscf(&self) -> Result<BasisSet, ParameterError> {
        self.choice(BASIS_PSCF)
    }

    pub fn edge(&self) -> Result<Edge, ParameterError> {
        self.choice(EDGE)
    }

    fn choice<T>(&self, key: &str) -> Result<T, ParameterError>
        where T: FromStr<Err = ParameterError> + Default
    {
        match self.raw(key) {
            None => Ok(T::default()),
            Some(Value::String(s)) => s.parse::<T>().map_err(|e| e.for_key(key)),
            // un valor no-string nunca pertenece al conjunto; se reporta con su JSON
            Some(other) => other.to_string().parse::<T>().map_err(|e| e.for_key(key)),
        }
    }

    /// `-kp A B C`, o `-scfkp A B C -pscfkp D E F` si hay override de SCF o
    /// post-SCF. El override ausente usa la malla unificada.
    pub fn get_makeinput_cmdline(&self) -> Result<String, ParameterError> {
        let unified = self.kpoint_mesh(KPOINTS)?.unwrap_or_default();
        let scf = self.kpoint_mesh(KPOINTS_SCF)?;
        let pscf = self.kpoint_mesh(KPOINTS_PSCF)?;
        if scf.is_none() && pscf.is_none() {
            return Ok(format!("-kp {unified}"));
        }
        Ok(format!("-scfkp {} -pscfkp {}", scf.unwrap_or(unified), pscf.unwrap_or(unified)))
    }

    pub fn get_uolcao_cmdline(&self) -> Result<String, ParameterError> {
        let calc = self.calculation_type()?;
        let edge = self.edge()?;
        let line = match calc {
            CalculationType::Scf => format!("-scf {}", self.basis_scf()?),
            CalculationType::Pacs => format!("-pacs {edge}"),
            other if edge != Edge::Gs => format!("-{other} {edge}"),
            other => format!("-{other}"),
        };
        Ok(line)
    }

    /// `get_uolcao_cmdline` separado en argumentos.
    pub fn uolcao_args(&self) -> Result<Vec<String>, ParameterError> {
        Ok(self.get_uolcao_cmdline()?
               .split_whitespace()
               .map(str::to_string)
               .collect())
    }
}

/// Builder tipado: produce parámetros válidos por construcción.
#[derive(Debug, Default)]
pub struct ParametersBuilder {
    values: Map<String, Value>,
}

impl ParametersBuilder {
    pub fn kpoints(mut self, mesh: KPointMesh) -> Self {
        self.values.insert(KPOINTS.into(), mesh.into());
        self
    }

    pub fn kpoints_scf(mut self, mesh: KPointMesh) -> Self {
        self.values.insert(KPOINTS_SCF.into(), mesh.into());
        self
    }

    pub fn kpoints_pscf(mut self, mesh: KPointMesh) -> Self {
        self.values.insert(KPOINTS_PSCF.into(), mesh.into());
        self
    }

    pub fn calculation_type(mut self, calc: CalculationType) -> Self {
        self.values.insert(CALCULATION_TYPE.into(), calc.as_str().into());
        self
    }

    pub fn basis_scf(mut self, basis: BasisSet) -> Self {
        self.values.insert(BASIS_SCF.into(), basis.as_str().into());
        self
    }

    pub fn basis_pscf(mut self, basis: BasisSet) -> Self {
        self.values.insert(BASIS_PSCF.into(), basis.as_str().into());
        self
    }

    pub fn edge(mut self, edge: Edge) -> Self {
        self.values.insert(EDGE.into(), edge.as_str().into());
        self
    }

    pub fn build(self) -> OlcaoParameters {
        OlcaoParameters::new(self.values)
    }
}
