//! Inheritance-affecting severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity attached to a rule or forced onto an `extends` edge.
///
/// `Recommended` and `All` are inheritance policies; the remaining variants
/// are concrete levels. "Not yet decided by any ancestor" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Recommended,
    All,
    Off,
    Error,
    Warn,
    Info,
    Hint,
}

/// Levels a rule definition may declare for itself.
pub const RULE_LEVELS: &[&str] = &["error", "warn", "info", "hint", "off"];

/// Every accepted severity keyword.
pub const SEVERITY_KEYWORDS: &[&str] = &["recommended", "all", "off", "error", "warn", "info", "hint"];

impl Severity {
    /// Concrete levels overwrite the severity of every rule they are applied to.
    pub fn is_forced(self) -> bool {
        matches!(
            self,
            Severity::Off | Severity::Error | Severity::Warn | Severity::Info | Severity::Hint
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Recommended => "recommended",
            Severity::All => "all",
            Severity::Off => "off",
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(Severity::Recommended),
            "all" => Ok(Severity::All),
            "off" => Ok(Severity::Off),
            "error" => Ok(Severity::Error),
            "warn" => Ok(Severity::Warn),
            "info" => Ok(Severity::Info),
            "hint" => Ok(Severity::Hint),
            other => Err(format!("unknown severity: '{}'", other)),
        }
    }
}

/// Severity handed to the ruleset on the far side of an `extends` edge.
///
/// Forcing flows strictly downward: once a caller has decided a severity,
/// an edge further down cannot replace it. Without either, `recommended`.
pub fn effective_severity(caller: Option<Severity>, edge: Option<Severity>) -> Severity {
    match (caller, edge) {
        (Some(caller), _) => caller,
        (None, Some(edge)) => edge,
        (None, None) => Severity::Recommended,
    }
}
