//! Named motion archetypes the harness can run by name.
use serde::{Deserialize, Serialize};

const DEFAULT_LENS_DATA: &str = include_str!("../assets/lenses.json");

/// A preset pairing a strategy id with a parameter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    pub name: String,
    pub strategy: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LensCatalog {
    #[serde(default)]
    pub lenses: Vec<Lens>,
}

impl LensCatalog {
    /// Catalog bundled with the binary. An unreadable bundle yields an
    /// empty catalog.
    #[must_use]
    pub fn load_default() -> Self {
        Self::from_json(DEFAULT_LENS_DATA).unwrap_or_default()
    }

    /// Parse a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the text is not a valid catalog.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Lens> {
        self.lenses
            .iter()
            .find(|lens| lens.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lenses.iter().map(|lens| lens.name.as_str())
    }
}
