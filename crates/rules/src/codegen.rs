//! Reference resolution: turning a document with cross-file `$ref`s into a
//! set of generated modules the [`ModuleLoader`](crate::module::ModuleLoader)
//! can instantiate.
//!
//! [`ReferenceResolver`] is the seam; [`RefCodegen`] is the default
//! implementation. Both talk to storage only through [`CodegenHost`].

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, RulesetError};
use crate::identity::{is_url, RulesetIdentity};
use crate::module::{GeneratedModules, ModuleNode, ModuleSource, CREATE_ARRAY};
use crate::source::{parse, FetchOptions, RulesetSource};

/// Meta-schemas that are handed over as raw text, never parsed.
pub const EXCLUDED_SOURCES: [&str; 2] = ["json-schema-draft-04.json", "json-schema-draft-07.json"];

/// Document extensions a `$ref` may point at and still be followed.
const RESOLVABLE_EXTENSIONS: &[&str] = &[".json", ".yaml", ".yml"];

/// What [`CodegenHost::read`] returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadContent {
    Parsed(Value),
    Raw(String),
}

/// The entry module produced by a resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub id: String,
}

/// Capabilities handed to a [`ReferenceResolver`]: read, write, should_resolve.
pub struct CodegenHost<'a> {
    source: &'a dyn RulesetSource,
    options: &'a FetchOptions,
    modules: GeneratedModules,
}

impl<'a> CodegenHost<'a> {
    pub fn new(source: &'a dyn RulesetSource, options: &'a FetchOptions) -> Self {
        Self {
            source,
            options,
            modules: GeneratedModules::new(),
        }
    }

    /// Fetch and parse a document; excluded meta-schemas come back verbatim.
    pub async fn read(&self, identity: &RulesetIdentity) -> Result<ReadContent> {
        let raw = self.source.read_parsable(identity, self.options).await?;
        let locator = identity.locator();
        if EXCLUDED_SOURCES.iter().any(|suffix| locator.ends_with(suffix)) {
            return Ok(ReadContent::Raw(raw));
        }
        parse(identity, &raw).map(ReadContent::Parsed)
    }

    /// Locate a referenced document relative to the document that references it.
    pub async fn locate(&self, from: &RulesetIdentity, reference: &str) -> Result<RulesetIdentity> {
        self.source.find_file(&from.directory(), reference).await
    }

    /// Capture a generated module under `id`.
    pub fn write(&mut self, id: impl Into<String>, module: ModuleSource) {
        self.modules.insert(id.into(), module);
    }

    /// Whether a `$ref` target (without fragment) should be followed.
    pub fn should_resolve(&self, reference: &str) -> bool {
        is_url(reference) || RESOLVABLE_EXTENSIONS.iter().any(|ext| reference.to_ascii_lowercase().ends_with(ext))
    }

    pub fn modules(&self) -> &GeneratedModules {
        &self.modules
    }

    pub fn into_modules(self) -> GeneratedModules {
        self.modules
    }
}

/// Produces generated modules for an entry document.
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    async fn resolve(&self, entry: &RulesetIdentity, host: &mut CodegenHost<'_>) -> Result<ResolvedEntry>;
}

/// Module id for a document.
pub fn module_id(identity: &RulesetIdentity) -> String {
    identity.locator()
}

/// Default resolver: one module per document, `$ref`s become links.
///
/// Links resolve whole modules, so two documents that `$ref` into each other
/// fail to instantiate with [`ModuleError::Circular`](crate::module::ModuleError)
/// even when the pointers themselves never loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefCodegen;

#[async_trait]
impl ReferenceResolver for RefCodegen {
    async fn resolve(&self, entry: &RulesetIdentity, host: &mut CodegenHost<'_>) -> Result<ResolvedEntry> {
        let entry_id = module_id(entry);
        let mut queue = VecDeque::from([entry.clone()]);
        let mut seen = HashSet::from([entry_id.clone()]);

        while let Some(identity) = queue.pop_front() {
            let id = module_id(&identity);
            let body = match host.read(&identity).await? {
                ReadContent::Raw(text) => ModuleNode::primitive(text),
                ReadContent::Parsed(document) => {
                    let mut targets = HashMap::new();
                    for reference in external_refs(&document, host) {
                        let (path, _) = split_ref(&reference);
                        if targets.contains_key(path) {
                            continue;
                        }
                        let target = host.locate(&identity, path).await?;
                        if seen.insert(module_id(&target)) {
                            queue.push_back(target.clone());
                        }
                        targets.insert(path.to_string(), module_id(&target));
                    }
                    Lowering::new(&identity, &document, &targets).lower(&document)?
                }
            };
            debug!(module = %id, "generated module");
            host.write(id, ModuleSource::new(body));
        }

        Ok(ResolvedEntry { id: entry_id })
    }
}

fn split_ref(reference: &str) -> (&str, &str) {
    reference.split_once('#').unwrap_or((reference, ""))
}

fn ref_of(value: &Value) -> Option<&str> {
    value.as_object()?.get("$ref")?.as_str()
}

/// Cross-document `$ref`s that the host agrees to follow, in document order.
fn external_refs(document: &Value, host: &CodegenHost<'_>) -> Vec<String> {
    fn walk(value: &Value, host: &CodegenHost<'_>, out: &mut Vec<String>) {
        if let Some(reference) = ref_of(value) {
            let (path, _) = split_ref(reference);
            if !path.is_empty() && host.should_resolve(path) {
                out.push(reference.to_string());
            }
            return;
        }
        match value {
            Value::Object(map) => map.values().for_each(|v| walk(v, host, out)),
            Value::Array(items) => items.iter().for_each(|v| walk(v, host, out)),
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(document, host, &mut out);
    out
}

/// Lowers one parsed document into a module body.
struct Lowering<'d> {
    identity: &'d RulesetIdentity,
    root: &'d Value,
    /// `$ref` path → module id of the referenced document.
    targets: &'d HashMap<String, String>,
    /// Local pointers currently being inlined.
    inlining: Vec<String>,
}

impl<'d> Lowering<'d> {
    fn new(identity: &'d RulesetIdentity, root: &'d Value, targets: &'d HashMap<String, String>) -> Self {
        Self {
            identity,
            root,
            targets,
            inlining: Vec::new(),
        }
    }

    fn lower(&mut self, value: &Value) -> Result<ModuleNode> {
        if let Some(reference) = ref_of(value) {
            return self.lower_ref(value, reference);
        }
        match value {
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, child) in map {
                    entries.push((key.clone(), self.lower(child)?));
                }
                Ok(ModuleNode::Object { entries })
            }
            Value::Array(items) => {
                let args = items.iter().map(|item| self.lower(item)).collect::<Result<Vec<_>>>()?;
                Ok(ModuleNode::call(CREATE_ARRAY, args))
            }
            other => Ok(ModuleNode::primitive(other.clone())),
        }
    }

    fn lower_ref(&mut self, value: &Value, reference: &str) -> Result<ModuleNode> {
        let (path, fragment) = split_ref(reference);
        let pointer = (!fragment.is_empty()).then(|| fragment.to_string());

        if !path.is_empty() {
            return Ok(match self.targets.get(path) {
                Some(module) => ModuleNode::link(module.clone(), pointer),
                // Declined by should_resolve: keep the reference as data.
                None => ModuleNode::literal(value),
            });
        }

        let pointer = pointer.unwrap_or_default();
        if self.inlining.contains(&pointer) {
            // Self-recursive local reference; leave it for consumers.
            return Ok(ModuleNode::literal(value));
        }
        let root = self.root;
        let target = root.pointer(&pointer).ok_or_else(|| RulesetError::Reference {
            locator: self.identity.to_string(),
            reference: reference.to_string(),
            reason: "pointer does not resolve".to_string(),
        })?;
        self.inlining.push(pointer);
        let lowered = self.lower(target);
        self.inlining.pop();
        lowered
    }
}
