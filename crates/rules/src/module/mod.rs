//! Virtual module loader.
//!
//! Reference resolution emits one [`ModuleSource`] per document it touches,
//! keyed by module id. [`ModuleLoader`] instantiates a requested module on
//! demand by interpreting that small IR, resolving links against a fixed set
//! of runtime helpers first and the generated sources second. Nothing here
//! reads from disk; every source is injected.

mod builtins;
mod error;
mod loader;
mod node;

#[cfg(test)]
mod tests;

pub use builtins::{Builtins, Helper, CREATE_ARRAY, RUNTIME_PREFIX};
pub use error::ModuleError;
pub use loader::{ModuleExport, ModuleLoader, ModuleScope};
pub use node::{GeneratedModules, ModuleNode, ModuleSource};
