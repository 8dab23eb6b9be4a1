//! Intermediate representation of generated modules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ModuleError;

/// One node of a generated module body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleNode {
    /// null, boolean, number or string.
    Primitive { value: Value },
    /// Object literal; entry order is preserved during evaluation.
    Object { entries: Vec<(String, ModuleNode)> },
    /// Array literal.
    Array { items: Vec<ModuleNode> },
    /// The exports of another module, optionally narrowed by a JSON pointer.
    Link {
        module: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pointer: Option<String>,
    },
    /// Apply a runtime helper to evaluated arguments.
    Call { helper: String, args: Vec<ModuleNode> },
}

impl ModuleNode {
    pub fn primitive(value: impl Into<Value>) -> Self {
        ModuleNode::Primitive { value: value.into() }
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, ModuleNode)>) -> Self {
        ModuleNode::Object {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn link(module: impl Into<String>, pointer: Option<String>) -> Self {
        ModuleNode::Link {
            module: module.into(),
            pointer,
        }
    }

    pub fn call(helper: impl Into<String>, args: Vec<ModuleNode>) -> Self {
        ModuleNode::Call {
            helper: helper.into(),
            args,
        }
    }

    /// Build a literal tree for a plain value (no links).
    pub fn literal(value: &Value) -> Self {
        match value {
            Value::Object(map) => ModuleNode::object(map.iter().map(|(k, v)| (k.clone(), ModuleNode::literal(v)))),
            Value::Array(items) => ModuleNode::Array {
                items: items.iter().map(ModuleNode::literal).collect(),
            },
            other => ModuleNode::primitive(other.clone()),
        }
    }
}

/// A generated module: a body whose evaluation becomes the module's exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSource {
    pub body: ModuleNode,
}

impl ModuleSource {
    pub fn new(body: ModuleNode) -> Self {
        Self { body }
    }

    /// Decode a module serialized as JSON text.
    pub fn from_json(text: &str) -> Result<Self, ModuleError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ModuleError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Generated module sources keyed by module id.
pub type GeneratedModules = HashMap<String, ModuleSource>;
