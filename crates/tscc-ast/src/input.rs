//! Unit interchange format.
//!
//! One JSON document per compilation unit, as written by the front-end:
//!
//! ```json
//! { "unit": { "file_name": "demo.ts", "declarations": [...], "arena": {...} },
//!   "semantics": { "node_types": {...}, "symbols": {...} } }
//! ```

use crate::decl::SourceUnit;
use crate::symbols::SemanticModel;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitInput {
    pub unit: SourceUnit,
    #[serde(default)]
    pub semantics: SemanticModel,
}

impl UnitInput {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[path = "../tests/input.rs"]
mod tests;
