//! Rule entries as declared in a ruleset and as stored in the flattened table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Severity;

/// A value under a ruleset's `rules` mapping.
///
/// Full definitions add (or replace) a rule; toggles adjust the severity of a
/// rule inherited from a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Toggle(bool),
    Level(Severity),
    Definition(RuleEntry),
}

/// A named rule definition.
///
/// Only `severity`, `recommended` and `formats` matter to resolution; every
/// other field (`given`, `then`, `message`, ...) is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// Severity the rule was defined with, before any inherited policy forced
    /// it. A toggle that re-enables the rule restores this level.
    #[serde(skip)]
    pub declared: Option<Severity>,
}

impl RuleEntry {
    /// Names of the functions this rule's `then` clause(s) call.
    pub fn referenced_functions(&self) -> Vec<&str> {
        match self.fields.get("then") {
            Some(Value::Object(then)) => then.get("function").and_then(Value::as_str).into_iter().collect(),
            Some(Value::Array(thens)) => thens
                .iter()
                .filter_map(|then| then.get("function").and_then(Value::as_str))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.severity != Some(Severity::Off)
    }
}
