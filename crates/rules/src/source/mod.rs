//! Fetch layer: locating and reading ruleset and function sources.
//!
//! [`RulesetSource`] is the seam between resolution and storage. The crate ships
//! [`FsSource`] (local files, packages, http/https) and [`MemorySource`]
//! (an in-memory tree for embedding and tests).

mod fs;
mod memory;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, RulesetError};
use crate::identity::{is_url, Location, RulesetIdentity};

pub use fs::FsSource;
pub use memory::MemorySource;

/// File names tried, in order, when a reference names a bare package.
pub const PACKAGE_ENTRY_FILES: &[&str] = &["ruleset.yaml", "ruleset.yml", "ruleset.json", ".rulekit.yaml"];

/// Options forwarded verbatim to every read.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub timeout: Option<Duration>,
    /// HTTP client used as the transport agent for remote documents.
    pub agent: Option<reqwest::Client>,
}

impl FetchOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_agent(mut self, agent: reqwest::Client) -> Self {
        self.agent = Some(agent);
        self
    }
}

/// Locates and reads documents.
#[async_trait]
pub trait RulesetSource: Send + Sync {
    /// Resolve `reference` against `base` to an identity that exists.
    ///
    /// Fails with [`RulesetError::NotFound`] when nothing matches.
    async fn find_file(&self, base: &Location, reference: &str) -> Result<RulesetIdentity>;

    /// Read the raw text of a located document.
    async fn read_parsable(&self, identity: &RulesetIdentity, options: &FetchOptions) -> Result<String>;
}

/// Candidate identities for `reference`, in lookup order.
///
/// URL candidates are returned alone: their existence is only known once read.
pub(crate) fn candidates(base: &Location, reference: &str, packages_dir: &Path) -> Vec<RulesetIdentity> {
    if is_url(reference) {
        return url::Url::parse(reference)
            .map(|url| vec![RulesetIdentity::Url(url)])
            .unwrap_or_default();
    }
    if let Location::Url(_) = base {
        return base.join(reference).into_iter().collect();
    }
    if Path::new(reference).is_absolute() {
        return vec![RulesetIdentity::path(reference)];
    }

    let mut found: Vec<RulesetIdentity> = base.join(reference).into_iter().collect();
    if !is_explicitly_relative(reference) {
        found.extend(package_candidates(reference, packages_dir));
    }
    found
}

fn is_explicitly_relative(reference: &str) -> bool {
    reference.starts_with("./") || reference.starts_with("../") || reference == "." || reference == ".."
}

/// Split `@scope/name/sub/path` or `name/sub/path` into the package name and the rest.
fn split_package(reference: &str) -> Option<(String, String)> {
    let mut parts = reference.splitn(3, '/');
    let first = parts.next().filter(|s| !s.is_empty())?;
    if first.starts_with('@') {
        let second = parts.next().filter(|s| !s.is_empty())?;
        let rest = parts.next().unwrap_or_default();
        Some((format!("{}/{}", first, second), rest.to_string()))
    } else {
        let rest = reference[first.len()..].trim_start_matches('/');
        Some((first.to_string(), rest.to_string()))
    }
}

fn package_candidates(reference: &str, packages_dir: &Path) -> Vec<RulesetIdentity> {
    let Some((name, rest)) = split_package(reference) else {
        return Vec::new();
    };
    let root: PathBuf = packages_dir.join(&name);
    if rest.is_empty() {
        PACKAGE_ENTRY_FILES
            .iter()
            .map(|file| RulesetIdentity::package(&name, &root, root.join(file)))
            .collect()
    } else {
        vec![RulesetIdentity::package(&name, &root, root.join(rest))]
    }
}

pub(crate) fn not_found(base: &Location, reference: &str) -> RulesetError {
    RulesetError::NotFound {
        reference: reference.to_string(),
        base: base.to_string(),
    }
}

/// Parse raw text: JSON when the locator ends in `.json`, YAML otherwise.
pub fn parse(identity: &RulesetIdentity, raw: &str) -> Result<Value> {
    if identity.extension().as_deref() == Some("json") {
        serde_json::from_str(raw).map_err(|e| RulesetError::parse(identity, e))
    } else {
        serde_yaml::from_str(raw).map_err(|e| RulesetError::parse(identity, e))
    }
}
