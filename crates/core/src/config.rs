use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str) -> Option<u64> {
    profiled_env_opt(profile, key).and_then(|v| v.parse().ok())
}

pub const DEFAULT_PACKAGES_DIR: &str = "node_modules";
pub const DEFAULT_FUNCTION_EXT: &str = "js";

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub fetch: FetchConfig,
    pub resolver: ResolverConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `RULEKIT_PROFILE`. When set (e.g. `CI`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("RULEKIT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            fetch: FetchConfig::from_env_profiled(p),
            resolver: ResolverConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::debug!("Config loaded (profile: {}):", self.profile_label());
        tracing::debug!(
            "  fetch:     timeout={}",
            self.fetch
                .timeout()
                .map(|t| format!("{}ms", t.as_millis()))
                .unwrap_or_else(|| "(none)".to_string())
        );
        tracing::debug!(
            "  resolver:  base_dir={}, packages_dir={}, function_ext={}",
            self.resolver.base_dir.display(),
            self.resolver.packages_dir.display(),
            self.resolver.function_ext
        );
    }
}

// ── Fetch ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Timeout forwarded to every file/network read. `None` waits forever.
    pub timeout_ms: Option<u64>,
}

impl FetchConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            timeout_ms: profiled_env_u64(p, "RULEKIT_TIMEOUT_MS"),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

// ── Resolver ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    /// Directory that top-level ruleset locators are resolved against.
    pub base_dir: PathBuf,
    /// Root directory holding package-sourced rulesets.
    pub packages_dir: PathBuf,
    /// File extension of custom function sources, without the dot.
    pub function_ext: String,
}

impl ResolverConfig {
    fn from_env_profiled(p: &str) -> Self {
        let cwd = current_dir();
        let base_dir = match profiled_env_opt(p, "RULEKIT_BASE_DIR") {
            Some(dir) => crate::paths::absolutize(&cwd, Path::new(&dir)),
            None => cwd,
        };
        let packages_dir = PathBuf::from(profiled_env_or(p, "RULEKIT_PACKAGES_DIR", DEFAULT_PACKAGES_DIR));
        Self {
            packages_dir: crate::paths::absolutize(&base_dir, &packages_dir),
            base_dir,
            function_ext: profiled_env_or(p, "RULEKIT_FUNCTION_EXT", DEFAULT_FUNCTION_EXT),
        }
    }
}

impl ResolverConfig {
    /// Move the base directory, carrying a packages dir that lived under the
    /// old base along with it.
    pub fn rebase(&mut self, base_dir: PathBuf) {
        if let Ok(rel) = self.packages_dir.strip_prefix(&self.base_dir) {
            self.packages_dir = base_dir.join(rel);
        }
        self.base_dir = base_dir;
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let base_dir = current_dir();
        Self {
            packages_dir: base_dir.join(DEFAULT_PACKAGES_DIR),
            base_dir,
            function_ext: DEFAULT_FUNCTION_EXT.to_string(),
        }
    }
}

fn current_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
