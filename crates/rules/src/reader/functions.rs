//! Binding declared custom functions to their source files.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::Result;
use crate::identity::Location;
use crate::schema::{FunctionDeclaration, FunctionTable, ResolvedFunction};
use crate::source::{FetchOptions, RulesetSource};

/// Directory custom functions live in when a ruleset names none.
pub const DEFAULT_FUNCTIONS_DIR: &str = "functions";

/// Locates and reads custom function sources.
pub struct FunctionBinder<'a> {
    source: &'a dyn RulesetSource,
    options: &'a FetchOptions,
    extension: &'a str,
}

impl<'a> FunctionBinder<'a> {
    pub fn new(source: &'a dyn RulesetSource, options: &'a FetchOptions, extension: &'a str) -> Self {
        Self {
            source,
            options,
            extension,
        }
    }

    /// Resolve every declaration under `dir` concurrently.
    ///
    /// A function whose source cannot be found or read is logged and left out;
    /// the table keeps declaration order, later duplicates overwrite.
    pub async fn bind(&self, declarations: &[FunctionDeclaration], dir: &Location) -> FunctionTable {
        let lookups = declarations
            .iter()
            .map(|declaration| async move { (declaration, self.bind_one(declaration, dir).await) });

        let mut table = FunctionTable::new();
        for (declaration, outcome) in join_all(lookups).await {
            match outcome {
                Ok(function) => {
                    debug!(function = %function.name, source = %function.source, "bound custom function");
                    table.insert(function.name.clone(), function);
                }
                Err(e) => {
                    warn!(function = %declaration.name(), error = %e, "custom function unavailable; skipped");
                }
            }
        }
        table
    }

    async fn bind_one(&self, declaration: &FunctionDeclaration, dir: &Location) -> Result<ResolvedFunction> {
        let reference = format!("./{}.{}", declaration.name(), self.extension);
        let identity = self.source.find_file(dir, &reference).await?;
        let code = self.source.read_parsable(&identity, self.options).await?;
        Ok(ResolvedFunction {
            name: declaration.name().to_string(),
            code,
            schema: declaration.schema().cloned(),
            source: identity.locator(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use serde_json::json;

    #[tokio::test]
    async fn missing_sources_are_omitted() {
        let source = MemorySource::new("/nm")
            .with("/rules/functions/casing.js", "module.exports = casing;")
            .with("/rules/functions/params.js", "module.exports = params;");
        let options = FetchOptions::default();
        let binder = FunctionBinder::new(&source, &options, "js");

        let declarations = vec![
            FunctionDeclaration::Plain("casing".into()),
            FunctionDeclaration::Plain("missing".into()),
            FunctionDeclaration::WithSchema("params".into(), json!({"type": "object"})),
        ];
        let table = binder
            .bind(&declarations, &Location::dir("/rules/functions"))
            .await;

        let names: Vec<_> = table.keys().cloned().collect();
        assert_eq!(names, vec!["casing", "params"]);
        assert_eq!(table["casing"].code, "module.exports = casing;");
        assert_eq!(table["casing"].source, "/rules/functions/casing.js");
        assert_eq!(table["params"].schema, Some(json!({"type": "object"})));
    }

    #[tokio::test]
    async fn extension_is_configurable() {
        let source = MemorySource::new("/nm").with("/lib/check.ts", "export default check;");
        let options = FetchOptions::default();
        let binder = FunctionBinder::new(&source, &options, "ts");

        let table = binder
            .bind(&[FunctionDeclaration::Plain("check".into())], &Location::dir("/lib"))
            .await;
        assert_eq!(table.len(), 1);
    }
}
