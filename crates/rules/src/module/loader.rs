//! [`ModuleLoader`]: cached, synchronous instantiation of generated modules.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::{Builtins, GeneratedModules, Helper, ModuleError, ModuleNode, ModuleSource};

/// What `require` hands back for a module id.
#[derive(Debug, Clone)]
pub enum ModuleExport {
    Value(Value),
    Helper(Helper),
}

/// Instantiates generated modules on demand and caches their exports.
///
/// Resolution order for an id: runtime helpers, cache, generated sources.
#[derive(Debug)]
pub struct ModuleLoader {
    builtins: Builtins,
    sources: HashMap<String, Arc<ModuleSource>>,
    cache: HashMap<String, Value>,
    /// Ids currently being evaluated, outermost first.
    loading: Vec<String>,
}

impl ModuleLoader {
    pub fn new(sources: GeneratedModules) -> Self {
        Self::with_builtins(sources, Builtins::default())
    }

    pub fn with_builtins(sources: GeneratedModules, builtins: Builtins) -> Self {
        Self {
            builtins,
            sources: sources.into_iter().map(|(id, src)| (id, Arc::new(src))).collect(),
            cache: HashMap::new(),
            loading: Vec::new(),
        }
    }

    /// Instantiate a module, evaluating it at most once.
    pub fn instantiate(&mut self, id: &str) -> Result<ModuleExport, ModuleError> {
        if let Some(helper) = self.builtins.get(id) {
            return Ok(ModuleExport::Helper(helper));
        }
        if let Some(value) = self.cache.get(id) {
            debug!(module = %id, "module cache hit");
            return Ok(ModuleExport::Value(value.clone()));
        }

        let source = self
            .sources
            .get(id)
            .cloned()
            .ok_or_else(|| ModuleError::NotFound(id.to_string()))?;

        if self.loading.iter().any(|loading| loading == id) {
            let mut chain = self.loading.clone();
            chain.push(id.to_string());
            return Err(ModuleError::Circular(chain));
        }

        debug!(module = %id, "instantiating module");
        self.loading.push(id.to_string());
        let exports = {
            let mut scope = ModuleScope::new(self);
            scope.run(&source.body).map(|()| scope.into_exports())
        };
        self.loading.pop();

        let value = exports?;
        self.cache.insert(id.to_string(), value.clone());
        Ok(ModuleExport::Value(value))
    }

    /// Instantiate a module that must export a value.
    pub fn instantiate_value(&mut self, id: &str) -> Result<Value, ModuleError> {
        match self.instantiate(id)? {
            ModuleExport::Value(value) => Ok(value),
            ModuleExport::Helper(_) => Err(ModuleError::NotAValue(id.to_string())),
        }
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.cache.contains_key(id)
    }
}

/// The isolated scope a module body runs in.
///
/// It exposes exactly two bindings: `require` (back into the loader) and the
/// mutable `exports` cell the body assigns its result to.
pub struct ModuleScope<'l> {
    loader: &'l mut ModuleLoader,
    exports: Value,
}

impl<'l> ModuleScope<'l> {
    fn new(loader: &'l mut ModuleLoader) -> Self {
        Self {
            loader,
            exports: Value::Object(Map::new()),
        }
    }

    pub fn require(&mut self, id: &str) -> Result<ModuleExport, ModuleError> {
        self.loader.instantiate(id)
    }

    /// Starts out as an empty object, like an unassigned module's exports.
    pub fn exports(&mut self) -> &mut Value {
        &mut self.exports
    }

    fn into_exports(self) -> Value {
        self.exports
    }

    /// Evaluate the body and assign it to `exports`.
    fn run(&mut self, body: &ModuleNode) -> Result<(), ModuleError> {
        let value = self.eval(body)?;
        *self.exports() = value;
        Ok(())
    }

    fn eval(&mut self, node: &ModuleNode) -> Result<Value, ModuleError> {
        match node {
            ModuleNode::Primitive { value } => Ok(value.clone()),
            ModuleNode::Object { entries } => {
                let mut map = Map::with_capacity(entries.len());
                for (key, child) in entries {
                    map.insert(key.clone(), self.eval(child)?);
                }
                Ok(Value::Object(map))
            }
            ModuleNode::Array { items } => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            ModuleNode::Link { module, pointer } => {
                let value = match self.require(module)? {
                    ModuleExport::Value(value) => value,
                    ModuleExport::Helper(_) => return Err(ModuleError::NotAValue(module.clone())),
                };
                match pointer.as_deref() {
                    None | Some("") => Ok(value),
                    Some(pointer) => value.pointer(pointer).cloned().ok_or_else(|| ModuleError::InvalidPointer {
                        module: module.clone(),
                        pointer: pointer.to_string(),
                    }),
                }
            }
            ModuleNode::Call { helper, args } => {
                let function = match self.require(helper)? {
                    ModuleExport::Helper(function) => function,
                    ModuleExport::Value(_) => return Err(ModuleError::NotCallable(helper.clone())),
                };
                let args = args.iter().map(|arg| self.eval(arg)).collect::<Result<Vec<_>, _>>()?;
                function(args)
            }
        }
    }
}
