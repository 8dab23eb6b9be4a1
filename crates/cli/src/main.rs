mod cli;
mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use rulekit_core::config::{load_dotenv, Config};
use rulekit_core::paths::absolutize;
use rulekit_rules::validation::validate_yaml;
use rulekit_rules::RulesetReader;

use crate::cli::{CliArgs, Command, ResolveArgs, ValidateArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };

    match args.command {
        Command::Resolve(resolve) => run_resolve(config, resolve).await,
        Command::Validate(validate) => run_validate(validate),
    }
}

async fn run_resolve(mut config: Config, args: ResolveArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    if let Some(dir) = &args.base_dir {
        config.resolver.rebase(absolutize(&cwd, dir));
    }
    if let Some(dir) = &args.packages_dir {
        config.resolver.packages_dir = absolutize(&cwd, dir);
    }
    if let Some(ext) = args.function_ext {
        config.resolver.function_ext = ext;
    }
    if args.timeout_ms.is_some() {
        config.fetch.timeout_ms = args.timeout_ms;
    }
    config.log_summary();

    let reader = RulesetReader::from_config(&config);
    let ruleset = reader
        .read_rulesets(&args.uris)
        .await
        .with_context(|| format!("failed to resolve {}", args.uris.join(", ")))?;

    info!(
        rules = ruleset.rules.len(),
        functions = ruleset.functions.len(),
        "resolution complete"
    );
    output::print_ruleset(&ruleset, args.output)
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let display = args.file.display().to_string();
    let text = std::fs::read_to_string(&args.file).with_context(|| format!("failed to read {display}"))?;

    let result = validate_yaml(&text);
    output::print_validation(&display, &result)?;
    if !result.valid {
        bail!("{display} has {} error(s)", result.errors.len());
    }
    println!("{display}: ok");
    Ok(())
}
