use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Resolve and inspect rulesets.
///
/// Reads one or more rulesets, follows their `extends` graph and prints the
/// flattened rule table.
#[derive(Parser, Debug)]
#[command(name = "rulekit", version, about = "Resolve and inspect rulesets")]
pub struct CliArgs {
    /// Configuration profile (prefix for RULEKIT_* variables)
    #[arg(long, global = true, env = "RULEKIT_PROFILE")]
    pub profile: Option<String>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve rulesets into one flattened table
    Resolve(ResolveArgs),
    /// Check the structure of a single ruleset file without following extends
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Ruleset locators: paths, package references or URLs
    #[arg(required = true)]
    pub uris: Vec<String>,

    /// Directory locators are resolved against (default: current directory)
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Root directory of package-sourced rulesets
    #[arg(long)]
    pub packages_dir: Option<PathBuf>,

    /// Timeout for each file or network read, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Extension of custom function sources
    #[arg(long)]
    pub function_ext: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, env = "RULEKIT_OUTPUT", default_value_t = OutputFormat::Summary)]
    pub output: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Ruleset file to check
    pub file: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolve_with_overrides() {
        let args = CliArgs::parse_from([
            "rulekit",
            "resolve",
            "a.yaml",
            "@acme/style",
            "--packages-dir",
            "/pkgs",
            "--timeout-ms",
            "250",
            "-o",
            "json",
        ]);
        match args.command {
            Command::Resolve(resolve) => {
                assert_eq!(resolve.uris, vec!["a.yaml", "@acme/style"]);
                assert_eq!(resolve.packages_dir, Some(PathBuf::from("/pkgs")));
                assert_eq!(resolve.timeout_ms, Some(250));
                assert_eq!(resolve.output, OutputFormat::Json);
            }
            other => panic!("expected resolve, got {other:?}"),
        }
    }

    #[test]
    fn resolve_requires_a_locator() {
        assert!(CliArgs::try_parse_from(["rulekit", "resolve"]).is_err());
    }

    #[test]
    fn verbose_is_global() {
        let args = CliArgs::parse_from(["rulekit", "validate", "r.yaml", "--verbose"]);
        assert!(args.verbose);
    }
}
