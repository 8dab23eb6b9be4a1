//! Ruleset identities and the locations they are resolved against.
//!
//! A [`RulesetIdentity`] is a normalized absolute locator. Two identities are
//! equal when they point at the same file or URL, regardless of whether one
//! was reached as a package reference and the other through a relative path.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use rulekit_core::paths::{absolutize, normalize_path};
use url::Url;

/// Normalized absolute locator of a ruleset (or function source) document.
#[derive(Debug, Clone)]
pub enum RulesetIdentity {
    /// A local file.
    Path(PathBuf),
    /// A file inside a package directory under the packages root.
    Package {
        name: String,
        root: PathBuf,
        path: PathBuf,
    },
    /// A remote document.
    Url(Url),
}

impl RulesetIdentity {
    pub fn path(path: impl AsRef<Path>) -> Self {
        RulesetIdentity::Path(normalize_path(path.as_ref()))
    }

    pub fn package(name: impl Into<String>, root: impl AsRef<Path>, path: impl AsRef<Path>) -> Self {
        RulesetIdentity::Package {
            name: name.into(),
            root: normalize_path(root.as_ref()),
            path: normalize_path(path.as_ref()),
        }
    }

    /// Local file path, if the identity is not a URL.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            RulesetIdentity::Path(path) | RulesetIdentity::Package { path, .. } => Some(path),
            RulesetIdentity::Url(_) => None,
        }
    }

    /// Root directory of the package this identity was sourced from.
    pub fn package_root(&self) -> Option<&Path> {
        match self {
            RulesetIdentity::Package { root, .. } => Some(root),
            _ => None,
        }
    }

    /// Base that custom function sources are looked up under: the package root
    /// for package-sourced rulesets, the containing directory otherwise.
    pub fn function_base(&self) -> Location {
        match self {
            RulesetIdentity::Package { name, root, .. } => Location::Package {
                name: name.clone(),
                root: root.clone(),
                dir: root.clone(),
            },
            other => other.directory(),
        }
    }

    /// Directory containing this document; relative references resolve against it.
    pub fn directory(&self) -> Location {
        match self {
            RulesetIdentity::Path(path) => Location::Dir(parent_dir(path)),
            RulesetIdentity::Package { name, root, path } => Location::Package {
                name: name.clone(),
                root: root.clone(),
                dir: parent_dir(path),
            },
            RulesetIdentity::Url(url) => Location::Url(url.join(".").unwrap_or_else(|_| url.clone())),
        }
    }

    /// Lowercased extension of the final path segment.
    pub fn extension(&self) -> Option<String> {
        let last = match self {
            RulesetIdentity::Url(url) => url.path_segments()?.next_back()?.to_string(),
            _ => self.file_path()?.file_name()?.to_str()?.to_string(),
        };
        let (_, ext) = last.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }

    /// The plain locator string used for equality, hashing and module ids.
    pub fn locator(&self) -> String {
        match self {
            RulesetIdentity::Path(path) | RulesetIdentity::Package { path, .. } => path.display().to_string(),
            RulesetIdentity::Url(url) => url.to_string(),
        }
    }
}

impl PartialEq for RulesetIdentity {
    fn eq(&self, other: &Self) -> bool {
        match (self.file_path(), other.file_path()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.locator() == other.locator(),
            _ => false,
        }
    }
}

impl Eq for RulesetIdentity {}

impl Hash for RulesetIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.file_path() {
            Some(path) => path.hash(state),
            None => self.locator().hash(state),
        }
    }
}

impl fmt::Display for RulesetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesetIdentity::Package { name, root, path } => match path.strip_prefix(root) {
                Ok(rest) => write!(f, "{}/{}", name, rest.display()),
                Err(_) => write!(f, "{}", path.display()),
            },
            other => f.write_str(&other.locator()),
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("/"))
}

/// A directory-like base that references are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Dir(PathBuf),
    /// A directory inside a package; files found here keep their package identity.
    Package {
        name: String,
        root: PathBuf,
        dir: PathBuf,
    },
    Url(Url),
}

impl Location {
    pub fn dir(path: impl AsRef<Path>) -> Self {
        Location::Dir(normalize_path(path.as_ref()))
    }

    /// Resolve a relative (or absolute) reference to a file identity.
    ///
    /// Returns `None` only when a URL base cannot join the reference.
    pub fn join(&self, reference: &str) -> Option<RulesetIdentity> {
        match self {
            Location::Dir(dir) => Some(RulesetIdentity::Path(absolutize(dir, Path::new(reference)))),
            Location::Package { name, root, dir } => {
                let path = absolutize(dir, Path::new(reference));
                if path.starts_with(root) {
                    Some(RulesetIdentity::Package {
                        name: name.clone(),
                        root: root.clone(),
                        path,
                    })
                } else {
                    Some(RulesetIdentity::Path(path))
                }
            }
            Location::Url(base) => base.join(reference).ok().map(RulesetIdentity::Url),
        }
    }

    /// Resolve a subdirectory, keeping the location's kind.
    pub fn join_dir(&self, reference: &str) -> Location {
        match self {
            Location::Dir(dir) => Location::Dir(absolutize(dir, Path::new(reference))),
            Location::Package { name, root, dir } => Location::Package {
                name: name.clone(),
                root: root.clone(),
                dir: absolutize(dir, Path::new(reference)),
            },
            Location::Url(base) => {
                let with_slash = format!("{}/", reference.trim_end_matches('/'));
                Location::Url(base.join(&with_slash).unwrap_or_else(|_| base.clone()))
            }
        }
    }

    /// Rewrite an exception target (`path#pointer` or a pattern) relative to this location.
    ///
    /// Absolute paths, URLs and pointer-only targets are kept as-is apart from
    /// normalization.
    pub fn scope_target(&self, target: &str) -> String {
        let (path, fragment) = match target.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (target, None),
        };

        let scoped = if path.is_empty() || is_url(path) {
            path.to_string()
        } else {
            match self.join(path) {
                Some(identity) => identity.locator(),
                None => path.to_string(),
            }
        };

        match fragment {
            Some(fragment) => format!("{}#{}", scoped, fragment),
            None => scoped,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Dir(dir) | Location::Package { dir, .. } => write!(f, "{}", dir.display()),
            Location::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Absolute http(s) URL check used before any path handling.
pub fn is_url(reference: &str) -> bool {
    Url::parse(reference)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
