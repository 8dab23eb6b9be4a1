//! Error types for ruleset resolution.

use crate::module::ModuleError;
use crate::validation::ValidationResult;

/// Errors that can occur while reading and resolving rulesets.
#[derive(Debug, thiserror::Error)]
pub enum RulesetError {
    /// A ruleset (or referenced document) locator matched nothing.
    #[error("Could not find '{reference}' (resolved from {base})")]
    NotFound { reference: String, base: String },

    /// I/O, HTTP, or timeout failure while reading a located document.
    #[error("Failed to read {locator}: {reason}")]
    Read { locator: String, reason: String },

    /// YAML/JSON parse or deserialization error.
    #[error("Failed to parse {locator}: {reason}")]
    Parse { locator: String, reason: String },

    /// A `$ref` could not be followed.
    #[error("Invalid reference '{reference}' in {locator}: {reason}")]
    Reference {
        locator: String,
        reference: String,
        reason: String,
    },

    /// The instantiated document failed structural validation.
    #[error("Ruleset {identity} is invalid: {}", summarize(.result))]
    InvalidShape {
        identity: String,
        result: ValidationResult,
    },

    /// Internal inconsistency between generated modules and the loader.
    #[error("Module loader error: {0}")]
    Module(#[from] ModuleError),

    /// More than one top-level ruleset failed.
    #[error("{} rulesets failed: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<RulesetError>),
}

/// Result alias for ruleset operations.
pub type Result<T> = std::result::Result<T, RulesetError>;

impl RulesetError {
    pub(crate) fn read(locator: impl ToString, reason: impl ToString) -> Self {
        RulesetError::Read {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(locator: impl ToString, reason: impl ToString) -> Self {
        RulesetError::Parse {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RulesetError::NotFound { .. })
    }
}

fn summarize(result: &ValidationResult) -> String {
    result
        .errors
        .iter()
        .map(|e| {
            if e.path.is_empty() {
                e.message.clone()
            } else {
                format!("{}: {}", e.path, e.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_errors(errors: &[RulesetError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(" | ")
}
