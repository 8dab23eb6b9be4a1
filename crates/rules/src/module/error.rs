//! Module loader errors.

/// Errors raised while instantiating generated modules.
///
/// Every variant signals disagreement between the code generator and the
/// loader, never a problem with user data.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// The id matches neither a runtime helper nor a generated source.
    #[error("Cannot find module '{0}'")]
    NotFound(String),

    /// A link targeted a runtime helper instead of a value module.
    #[error("Module '{0}' is a runtime helper, not a value")]
    NotAValue(String),

    /// A call targeted a value module instead of a runtime helper.
    #[error("Module '{0}' is not callable")]
    NotCallable(String),

    /// A module was required while it was still being evaluated.
    #[error("Circular module dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),

    /// A link pointer does not resolve inside the target module's value.
    #[error("Pointer '{pointer}' does not resolve inside module '{module}'")]
    InvalidPointer { module: String, pointer: String },

    /// Serialized module source could not be decoded.
    #[error("Invalid module source: {0}")]
    Source(#[from] serde_json::Error),
}
