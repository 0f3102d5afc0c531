use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data_source::SourceError;

/// Listing sources known to the backend search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Inmoup,
    Mendozaprop,
}

impl SourceId {
    pub const ALL: [Self; 2] = [Self::Inmoup, Self::Mendozaprop];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inmoup => "inmoup",
            Self::Mendozaprop => "mendozaprop",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = SourceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inmoup" => Ok(Self::Inmoup),
            "mendozaprop" => Ok(Self::Mendozaprop),
            _ => Err(SourceError::unknown_source(value.trim())),
        }
    }
}
