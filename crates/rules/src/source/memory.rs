//! In-memory [`RulesetSource`] keyed by absolute path or URL.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{candidates, not_found, FetchOptions, RulesetSource};
use crate::error::{Result, RulesetError};
use crate::identity::{Location, RulesetIdentity};

/// A fixed document tree held in memory.
///
/// Paths are normalized on insertion, so `add("/a/./b.yaml", ..)` and a lookup
/// of `/a/b.yaml` meet.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
    packages_dir: PathBuf,
}

impl MemorySource {
    pub fn new(packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents: HashMap::new(),
            packages_dir: packages_dir.into(),
        }
    }

    /// Add a document under an absolute path or an http(s) URL.
    pub fn add(&mut self, locator: &str, contents: impl Into<String>) -> &mut Self {
        self.documents.insert(key_of(locator), contents.into());
        self
    }

    pub fn with(mut self, locator: &str, contents: impl Into<String>) -> Self {
        self.add(locator, contents);
        self
    }

    fn contains(&self, identity: &RulesetIdentity) -> bool {
        self.documents.contains_key(&identity.locator())
    }
}

fn key_of(locator: &str) -> String {
    match url::Url::parse(locator) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => RulesetIdentity::path(locator).locator(),
    }
}

#[async_trait]
impl RulesetSource for MemorySource {
    async fn find_file(&self, base: &Location, reference: &str) -> Result<RulesetIdentity> {
        candidates(base, reference, &self.packages_dir)
            .into_iter()
            .find(|candidate| self.contains(candidate))
            .ok_or_else(|| not_found(base, reference))
    }

    async fn read_parsable(&self, identity: &RulesetIdentity, _options: &FetchOptions) -> Result<String> {
        self.documents
            .get(&identity.locator())
            .cloned()
            .ok_or_else(|| RulesetError::read(identity, "no such document"))
    }
}
