//! Enumeraciones cerradas de opciones OLCAO (tipo de cálculo, base, borde).
//!
//! Cada enum se genera con `choice_enum!`, que aporta `as_str`, `ALL`,
//! `FromStr` (con mensaje que enumera los valores permitidos), `Display` y
//! serde como string plano.

/// Declara un enum de opciones textuales con su tabla de literales.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident, key = $key:literal { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Todos los valores en el orden canónico.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Lista legible de valores permitidos, separada por comas.
            pub fn allowed() -> String {
                Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::ParameterError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::ParameterError::InvalidChoice { key: $key.to_string(),
                                                                        value: other.to_string(),
                                                                        allowed: Self::allowed() }),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

choice_enum! {
    /// Tipo de cálculo que ejecuta `uolcao`.
    CalculationType, key = "calculation_type" {
        Scf => "scf",
        Dos => "dos",
        Bond => "bond",
        Sybd => "sybd",
        Optc => "optc",
        Pacs => "pacs",
        Field => "field",
        Force => "force",
        Nlop => "nlop",
        Sige => "sige",
        Loen => "loen",
    }
}

impl CalculationType {
    /// Cálculos que dependen de un SCF convergido (todos menos `scf`).
    pub const POST_SCF: &'static [CalculationType] = &[CalculationType::Dos,
                                                       CalculationType::Bond,
                                                       CalculationType::Sybd,
                                                       CalculationType::Optc,
                                                       CalculationType::Pacs,
                                                       CalculationType::Field,
                                                       CalculationType::Force,
                                                       CalculationType::Nlop,
                                                       CalculationType::Sige,
                                                       CalculationType::Loen];

    pub fn is_post_scf(&self) -> bool {
        Self::POST_SCF.contains(self)
    }

    /// Base recomendada para el paso post-SCF de este tipo. `None` para `scf`.
    pub fn recommended_basis(&self) -> Option<BasisSet> {
        use BasisSet::*;
        use CalculationType::*;
        match self {
            Scf => None,
            Dos | Sybd | Field | Force | Sige => Some(Full),
            Bond | Loen => Some(Minimal),
            Optc | Pacs | Nlop => Some(Extended),
        }
    }
}

impl Default for CalculationType {
    fn default() -> Self {
        CalculationType::Scf
    }
}

choice_enum! {
    /// Nivel de base (extendida, completa, mínima).
    BasisSet, key = "basis" {
        Extended => "EB",
        Full => "FB",
        Minimal => "MB",
    }
}

impl Default for BasisSet {
    fn default() -> Self {
        BasisSet::Full
    }
}

choice_enum! {
    /// Borde de excitación; `gs` es el estado fundamental.
    Edge, key = "edge" {
        Gs => "gs",
        K1s => "1s",
        L2s => "2s",
        L2p => "2p",
        M3s => "3s",
        M3p => "3p",
        M3d => "3d",
        N4s => "4s",
        N4p => "4p",
        N4d => "4d",
        N4f => "4f",
        O5s => "5s",
        O5p => "5p",
        O5d => "5d",
        O5f => "5f",
        P6s => "6s",
        P6p => "6p",
        P6d => "6d",
        Q7s => "7s",
    }
}

impl Default for Edge {
    fn default() -> Self {
        Edge::Gs
    }
}
