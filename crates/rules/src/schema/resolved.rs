//! The flattened, conflict-free output of ruleset resolution.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RuleEntry;

/// A custom function whose source was located and read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFunction {
    pub name: String,
    /// Source text, opaque to resolution.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Locator the source was read from.
    pub source: String,
}

pub type RuleTable = IndexMap<String, RuleEntry>;
pub type FunctionTable = IndexMap<String, ResolvedFunction>;
/// Target locator (or pattern) → rule names suppressed for it.
pub type ExceptionTable = BTreeMap<String, BTreeSet<String>>;

/// Accumulator for one resolution call; immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRuleset {
    pub rules: RuleTable,
    pub functions: FunctionTable,
    pub exceptions: ExceptionTable,
}

impl ResolvedRuleset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another independently resolved ruleset into this one.
    ///
    /// Rules and functions are last-writer-wins; exception sets are unioned.
    pub fn union(&mut self, other: ResolvedRuleset) {
        self.rules.extend(other.rules);
        self.functions.extend(other.functions);
        for (target, names) in other.exceptions {
            self.exceptions.entry(target).or_default().extend(names);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.functions.is_empty() && self.exceptions.is_empty()
    }

    /// Rules whose severity is anything but `off`.
    pub fn enabled_rules(&self) -> impl Iterator<Item = (&String, &RuleEntry)> {
        self.rules.iter().filter(|(_, rule)| rule.is_enabled())
    }
}
