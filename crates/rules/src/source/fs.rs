//! Filesystem + HTTP backed [`RulesetSource`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{candidates, not_found, FetchOptions, RulesetSource};
use crate::error::{Result, RulesetError};
use crate::identity::{Location, RulesetIdentity};

/// Reads local files with `tokio::fs` and remote documents with `reqwest`.
#[derive(Debug, Clone)]
pub struct FsSource {
    packages_dir: PathBuf,
}

impl FsSource {
    pub fn new(packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
        }
    }

    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    async fn read_url(&self, url: &url::Url, options: &FetchOptions) -> Result<String> {
        let client = options.agent.clone().unwrap_or_default();
        let mut request = client.get(url.clone());
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RulesetError::read(url, e))?;
        response.text().await.map_err(|e| RulesetError::read(url, e))
    }
}

#[async_trait]
impl RulesetSource for FsSource {
    async fn find_file(&self, base: &Location, reference: &str) -> Result<RulesetIdentity> {
        for candidate in candidates(base, reference, &self.packages_dir) {
            match candidate.file_path() {
                None => return Ok(candidate),
                Some(path) => {
                    if tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false) {
                        debug!(reference = %reference, identity = %candidate, "located document");
                        return Ok(candidate);
                    }
                }
            }
        }
        Err(not_found(base, reference))
    }

    async fn read_parsable(&self, identity: &RulesetIdentity, options: &FetchOptions) -> Result<String> {
        match identity {
            RulesetIdentity::Url(url) => self.read_url(url, options).await,
            _ => {
                let path = identity.file_path().unwrap_or_else(|| Path::new(""));
                with_timeout(options.timeout, identity, tokio::fs::read_to_string(path))
                    .await?
                    .map_err(|e| RulesetError::read(identity, e))
            }
        }
    }
}

async fn with_timeout<F, T>(timeout: Option<Duration>, identity: &RulesetIdentity, fut: F) -> Result<T>
where
    F: Future<Output = T>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| RulesetError::read(identity, format!("timed out after {:?}", limit))),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn finds_local_then_package_files() {
        let dir = TempDir::new().expect("create tempdir");
        let packages = dir.path().join("node_modules");
        std::fs::create_dir_all(packages.join("@acme/rules")).unwrap();
        std::fs::write(packages.join("@acme/rules/ruleset.yml"), "rules: {}\n").unwrap();
        std::fs::write(dir.path().join("local.yaml"), "rules: {}\n").unwrap();

        let source = FsSource::new(&packages);
        let base = Location::dir(dir.path());

        let local = source.find_file(&base, "local.yaml").await.unwrap();
        assert!(local.package_root().is_none());

        let pkg = source.find_file(&base, "@acme/rules").await.unwrap();
        assert_eq!(pkg.package_root(), Some(packages.join("@acme/rules").as_path()));
        assert!(pkg.locator().ends_with("ruleset.yml"));

        let missing = source.find_file(&base, "./missing.yaml").await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn reads_file_contents() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("a.yaml");
        std::fs::write(&path, "rules: {}\n").unwrap();

        let source = FsSource::new(dir.path().join("node_modules"));
        let text = source
            .read_parsable(&RulesetIdentity::path(&path), &FetchOptions::default().with_timeout(Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(text, "rules: {}\n");
    }

    #[tokio::test]
    async fn read_of_vanished_file_is_read_error() {
        let dir = TempDir::new().expect("create tempdir");
        let source = FsSource::new(dir.path());
        let err = source
            .read_parsable(&RulesetIdentity::path(dir.path().join("gone.yaml")), &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RulesetError::Read { .. }));
    }
}
