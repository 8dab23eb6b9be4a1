//! [`RulesetReader`]: recursive resolution of rulesets and their `extends` graph.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexSet;
use rulekit_core::Config;
use tracing::{debug, info, warn};

use super::functions::{FunctionBinder, DEFAULT_FUNCTIONS_DIR};
use super::guard::CycleGuard;
use crate::codegen::{CodegenHost, RefCodegen, ReferenceResolver};
use crate::error::{Result, RulesetError};
use crate::identity::{Location, RulesetIdentity};
use crate::merge::{merge_exceptions, merge_formats, merge_functions, merge_resolved_rules, merge_rules};
use crate::module::ModuleLoader;
use crate::schema::{effective_severity, ResolvedRuleset, RulesetDocument, Severity};
use crate::source::{FetchOptions, FsSource, RulesetSource};
use crate::validation::validate_ruleset;

/// Options for one reader, shared by every read it performs.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Forwarded verbatim to every fetch.
    pub fetch: FetchOptions,
    /// Directory top-level locators are resolved against.
    pub base_dir: PathBuf,
    /// Extension of custom function sources, without the dot.
    pub function_ext: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        let resolver = rulekit_core::config::ResolverConfig::default();
        Self {
            fetch: FetchOptions::default(),
            base_dir: resolver.base_dir,
            function_ext: resolver.function_ext,
        }
    }
}

/// State threaded through every recursive call of one top-level read.
#[derive(Debug, Default)]
pub struct ResolveContext {
    guard: CycleGuard,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget visited rulesets before an independent top-level locator.
    pub fn reset(&mut self) {
        self.guard.clear();
    }

    pub fn visited(&self) -> usize {
        self.guard.len()
    }
}

/// Reads rulesets and flattens their inheritance graph into one table.
pub struct RulesetReader {
    source: Arc<dyn RulesetSource>,
    resolver: Arc<dyn ReferenceResolver>,
    options: ReadOptions,
}

impl RulesetReader {
    pub fn new(source: impl RulesetSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            resolver: Arc::new(RefCodegen),
            options: ReadOptions::default(),
        }
    }

    /// Reader over local files, packages and URLs, configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut fetch = FetchOptions::default();
        if let Some(timeout) = config.fetch.timeout() {
            fetch = fetch.with_timeout(timeout);
        }
        Self::new(FsSource::new(config.resolver.packages_dir.clone())).with_options(ReadOptions {
            fetch,
            base_dir: config.resolver.base_dir.clone(),
            function_ext: config.resolver.function_ext.clone(),
        })
    }

    pub fn with_resolver(mut self, resolver: impl ReferenceResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Read one top-level ruleset.
    pub async fn read_ruleset(&self, uri: &str) -> Result<ResolvedRuleset> {
        let identity = self.source.find_file(&self.base(), uri).await?;
        let mut ctx = ResolveContext::new();
        self.read_top_level(&mut ctx, identity).await
    }

    /// Read each distinct ruleset independently, in first-seen order.
    ///
    /// Locators that find the same ruleset (`a.yaml` and `./a.yaml`) are read
    /// once, under the first spelling. A failure for one locator does not stop
    /// the others.
    pub async fn read_each<I, S>(&self, uris: I) -> Vec<(String, Result<ResolvedRuleset>)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: IndexSet<String> = uris.into_iter().map(|uri| uri.as_ref().to_string()).collect();
        let base = self.base();
        let mut seen = HashSet::new();
        let mut ctx = ResolveContext::new();
        let mut outcomes = Vec::with_capacity(unique.len());
        for uri in unique {
            let identity = match self.source.find_file(&base, &uri).await {
                Ok(identity) => identity,
                Err(e) => {
                    outcomes.push((uri, Err(e)));
                    continue;
                }
            };
            if !seen.insert(identity.clone()) {
                debug!(uri = %uri, identity = %identity, "locator repeats an earlier ruleset; skipping");
                continue;
            }
            ctx.reset();
            let outcome = self.read_top_level(&mut ctx, identity).await;
            outcomes.push((uri, outcome));
        }
        outcomes
    }

    /// Read every locator and union the results into one ruleset.
    ///
    /// Every locator is processed; if any failed, the failure (or
    /// [`RulesetError::Multiple`]) is returned instead of the union.
    pub async fn read_rulesets<I, S>(&self, uris: I) -> Result<ResolvedRuleset>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut merged = ResolvedRuleset::new();
        let mut errors = Vec::new();
        for (uri, outcome) in self.read_each(uris).await {
            match outcome {
                Ok(ruleset) => merged.union(ruleset),
                Err(e) => {
                    warn!(uri = %uri, error = %e, "ruleset failed to resolve");
                    errors.push(e);
                }
            }
        }
        match errors.len() {
            0 => Ok(merged),
            1 => Err(errors.remove(0)),
            _ => Err(RulesetError::Multiple(errors)),
        }
    }

    fn base(&self) -> Location {
        Location::dir(&self.options.base_dir)
    }

    async fn read_top_level(&self, ctx: &mut ResolveContext, identity: RulesetIdentity) -> Result<ResolvedRuleset> {
        let locator = identity.to_string();
        let ruleset = self.resolve_identity(ctx, identity, None).await?.unwrap_or_default();
        info!(
            identity = %locator,
            rules = ruleset.rules.len(),
            functions = ruleset.functions.len(),
            exceptions = ruleset.exceptions.len(),
            "resolved ruleset"
        );
        Ok(ruleset)
    }

    /// Resolve `target` against `base`.
    ///
    /// `Ok(None)` means the ruleset was already merged during this read and
    /// contributes nothing further.
    pub fn resolve<'a>(
        &'a self,
        ctx: &'a mut ResolveContext,
        base: &'a Location,
        target: &'a str,
        inherited: Option<Severity>,
    ) -> BoxFuture<'a, Result<Option<ResolvedRuleset>>> {
        async move {
            let identity = self.source.find_file(base, target).await?;
            self.resolve_identity(ctx, identity, inherited).await
        }
        .boxed()
    }

    fn resolve_identity<'a>(
        &'a self,
        ctx: &'a mut ResolveContext,
        identity: RulesetIdentity,
        inherited: Option<Severity>,
    ) -> BoxFuture<'a, Result<Option<ResolvedRuleset>>> {
        async move {
            if !ctx.guard.visit(&identity) {
                debug!(identity = %identity, "ruleset already visited; skipping");
                return Ok(None);
            }

            let document = self.load_document(&identity).await?;
            let directory = identity.directory();
            let mut ruleset = ResolvedRuleset::new();

            for edge in &document.extends {
                let severity = effective_severity(inherited, edge.severity());
                debug!(identity = %identity, extends = %edge.locator(), severity = %severity, "following extends");
                if let Some(parent) = self.resolve(ctx, &directory, edge.locator(), Some(severity)).await? {
                    merge_resolved_rules(&mut ruleset.rules, parent.rules, severity);
                    ruleset.functions.extend(parent.functions);
                    merge_exceptions(&mut ruleset.exceptions, parent.exceptions, &directory);
                }
            }

            merge_rules(
                &mut ruleset.rules,
                document.rules,
                inherited.unwrap_or(Severity::Recommended),
            );
            merge_exceptions(&mut ruleset.exceptions, document.except, &directory);

            if let Some(formats) = &document.formats {
                merge_formats(&mut ruleset.rules, formats);
            }

            if let Some(declarations) = &document.functions {
                let dir = identity
                    .function_base()
                    .join_dir(document.functions_dir.as_deref().unwrap_or(DEFAULT_FUNCTIONS_DIR));
                let binder = FunctionBinder::new(self.source.as_ref(), &self.options.fetch, &self.options.function_ext);
                let bound = binder.bind(declarations, &dir).await;
                merge_functions(&mut ruleset.functions, bound, &ruleset.rules);
            }

            Ok(Some(ruleset))
        }
        .boxed()
    }

    /// Fetch, reference-resolve, instantiate and validate one document.
    async fn load_document(&self, identity: &RulesetIdentity) -> Result<RulesetDocument> {
        let mut host = CodegenHost::new(self.source.as_ref(), &self.options.fetch);
        let entry = self.resolver.resolve(identity, &mut host).await?;

        let mut loader = ModuleLoader::new(host.into_modules());
        let value = loader.instantiate_value(&entry.id)?;

        let validation = validate_ruleset(&value);
        if !validation.valid {
            return Err(RulesetError::InvalidShape {
                identity: identity.to_string(),
                result: validation,
            });
        }
        for warning in &validation.warnings {
            warn!(identity = %identity, path = %warning.path, "{}", warning.message);
        }

        RulesetDocument::from_value(value).map_err(|e| RulesetError::parse(identity, e))
    }
}
