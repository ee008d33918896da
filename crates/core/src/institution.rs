use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// The issuing bank or remittance service a slip was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InstitutionTag {
    MoneyGram,
    Ldb,
    Bcel,
    #[default]
    Unknown,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown institution: '{0}'")]
pub struct UnknownInstitution(pub String);

impl InstitutionTag {
    /// Wire label, `None` for [`InstitutionTag::Unknown`].
    pub fn label(self) -> Option<&'static str> {
        match self {
            InstitutionTag::MoneyGram => Some("MONEYGRAM"),
            InstitutionTag::Ldb => Some("LDB"),
            InstitutionTag::Bcel => Some("BCEL"),
            InstitutionTag::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != InstitutionTag::Unknown
    }
}

impl fmt::Display for InstitutionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().unwrap_or("UNKNOWN"))
    }
}

impl std::str::FromStr for InstitutionTag {
    type Err = UnknownInstitution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MONEYGRAM" => Ok(InstitutionTag::MoneyGram),
            "LDB" => Ok(InstitutionTag::Ldb),
            "BCEL" => Ok(InstitutionTag::Bcel),
            "UNKNOWN" => Ok(InstitutionTag::Unknown),
            _ => Err(UnknownInstitution(s.to_string())),
        }
    }
}

// Serialized as a nullable string: callers see `null` when no signature matched.
impl Serialize for InstitutionTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.label() {
            Some(label) => serializer.serialize_some(label),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for InstitutionTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => s.parse().map_err(serde::de::Error::custom),
            None => Ok(InstitutionTag::Unknown),
        }
    }
}
