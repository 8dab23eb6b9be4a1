//! Typed view of an instantiated ruleset document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::edges::deserialize_extends;
use super::{ExtendsEdge, FunctionDeclaration, RuleSpec};

/// A single ruleset document after reference resolution and shape validation.
///
/// `extends` entries and function declarations are already resolved into
/// their tagged variants, so nothing downstream re-inspects raw shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetDocument {
    #[serde(default, deserialize_with = "deserialize_extends")]
    pub extends: Vec<ExtendsEdge>,
    #[serde(default)]
    pub rules: IndexMap<String, RuleSpec>,
    #[serde(default)]
    pub functions: Option<Vec<FunctionDeclaration>>,
    #[serde(default)]
    pub functions_dir: Option<String>,
    #[serde(default)]
    pub formats: Option<Vec<String>>,
    #[serde(default)]
    pub except: IndexMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
}

impl RulesetDocument {
    /// Deserialize from the value produced by the module loader.
    pub fn from_value(value: Value) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
