//! Built-in runtime helpers available to every generated module.

use std::collections::BTreeMap;

use serde_json::Value;

use super::ModuleError;

/// Namespace reserved for runtime helpers.
pub const RUNTIME_PREFIX: &str = "@rulekit/runtime/";

/// Array construction helper used by the code generator for every array.
pub const CREATE_ARRAY: &str = "@rulekit/runtime/create-array";

/// A runtime helper: evaluated arguments in, value out.
pub type Helper = fn(Vec<Value>) -> Result<Value, ModuleError>;

/// Registry of runtime helpers, consulted before generated sources.
#[derive(Debug, Clone)]
pub struct Builtins {
    helpers: BTreeMap<String, Helper>,
}

impl Builtins {
    /// An empty registry (no helpers at all).
    pub fn empty() -> Self {
        Self {
            helpers: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, id: impl Into<String>, helper: Helper) -> &mut Self {
        self.helpers.insert(id.into(), helper);
        self
    }

    pub fn get(&self, id: &str) -> Option<Helper> {
        self.helpers.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.helpers.contains_key(id)
    }
}

impl Default for Builtins {
    fn default() -> Self {
        let mut builtins = Self::empty();
        builtins.register(CREATE_ARRAY, create_array);
        builtins
    }
}

fn create_array(args: Vec<Value>) -> Result<Value, ModuleError> {
    Ok(Value::Array(args))
}
