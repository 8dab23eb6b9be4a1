//! Ruleset reading: the recursive resolver, its cycle guard and the custom
//! function binder.
//!
//! # Example
//!
//! ```no_run
//! use rulekit_rules::reader::RulesetReader;
//! use rulekit_rules::source::FsSource;
//!
//! # async fn run() -> rulekit_rules::error::Result<()> {
//! let reader = RulesetReader::new(FsSource::new("node_modules"));
//! let ruleset = reader.read_rulesets(["./.rulekit.yaml"]).await?;
//! for (name, rule) in ruleset.enabled_rules() {
//!     println!("{name}: {:?}", rule.severity);
//! }
//! # Ok(())
//! # }
//! ```

mod functions;
mod guard;
mod resolver;

pub use functions::{FunctionBinder, DEFAULT_FUNCTIONS_DIR};
pub use guard::CycleGuard;
pub use resolver::{ReadOptions, ResolveContext, RulesetReader};
