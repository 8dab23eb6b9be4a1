//! Ruleset resolution engine.
//!
//! This crate provides:
//! - Typed ruleset documents with `extends`, toggles, custom functions and exceptions
//! - A recursive reader that flattens the `extends` graph into one rule table
//! - `$ref` resolution into generated modules and a small module loader to instantiate them
//! - Structural validation with "Did you mean …?" suggestions
//! - Local file, package and HTTP sources, plus an in-memory source

pub mod codegen;
pub mod error;
pub mod identity;
pub mod merge;
pub mod module;
pub mod reader;
pub mod schema;
pub mod source;
pub mod validation;

pub use error::{Result, RulesetError};
pub use identity::{Location, RulesetIdentity};
pub use reader::{ReadOptions, RulesetReader};
pub use schema::{ResolvedRuleset, Severity};
