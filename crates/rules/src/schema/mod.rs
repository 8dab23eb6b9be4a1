//! Ruleset document types with serde deserialization.
//!
//! Defines the types flowing through resolution:
//! - `RulesetDocument`: one instantiated ruleset (extends, rules, functions, except, formats)
//! - `ExtendsEdge` / `FunctionDeclaration`: bare-or-pair entries, resolved to tagged variants
//! - `RuleSpec` / `RuleEntry`: rule definitions and severity toggles
//! - `ResolvedRuleset`: the flattened rule/function/exception table

mod document;
mod edges;
mod resolved;
mod rule;
mod severity;

pub use document::*;
pub use edges::{ExtendsEdge, FunctionDeclaration};
pub use resolved::*;
pub use rule::*;
pub use severity::*;
