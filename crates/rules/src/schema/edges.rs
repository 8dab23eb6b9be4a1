//! `extends` edges and custom function declarations.
//!
//! Both accept either a bare string or a two-element list in ruleset
//! documents. The shape is decided once, at deserialization time.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Severity;

/// A parent ruleset reference, optionally forcing a severity onto everything
/// inherited through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtendsEdge {
    Plain(String),
    WithSeverity(String, Severity),
}

impl ExtendsEdge {
    pub fn locator(&self) -> &str {
        match self {
            ExtendsEdge::Plain(locator) | ExtendsEdge::WithSeverity(locator, _) => locator,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            ExtendsEdge::Plain(_) => None,
            ExtendsEdge::WithSeverity(_, severity) => Some(*severity),
        }
    }
}

/// Declares a custom function used by the ruleset's rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionDeclaration {
    Plain(String),
    WithSchema(String, Value),
}

impl FunctionDeclaration {
    pub fn name(&self) -> &str {
        match self {
            FunctionDeclaration::Plain(name) | FunctionDeclaration::WithSchema(name, _) => name,
        }
    }

    pub fn schema(&self) -> Option<&Value> {
        match self {
            FunctionDeclaration::Plain(_) => None,
            FunctionDeclaration::WithSchema(_, schema) => Some(schema),
        }
    }
}

/// Accept `extends: a.yaml`, `extends: [a.yaml, b.yaml]`, `extends: [a.yaml, off]`
/// and `extends: [[a.yaml, off], b.yaml]`.
///
/// A two-element list whose second item is a severity keyword is read as a
/// single edge with a forced severity.
pub(crate) fn deserialize_extends<'de, D>(deserializer: D) -> Result<Vec<ExtendsEdge>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(ExtendsEdge),
        Many(Vec<ExtendsEdge>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(edge)) => vec![edge],
        Some(OneOrMany::Many(edges)) => edges,
    })
}
