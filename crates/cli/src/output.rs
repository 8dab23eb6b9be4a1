use std::io::{self, Write};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use rulekit_rules::validation::ValidationResult;
use rulekit_rules::{ResolvedRuleset, Severity};

use crate::cli::OutputFormat;

/// Color scheme for summary output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const ERROR: Color = Color::Red;
    const WARN: Color = Color::Yellow;
    const INFO: Color = Color::Cyan;
    const HINT: Color = Color::Green;
    const DIM: Color = Color::DarkGrey;
}

fn severity_color(severity: Option<Severity>) -> Color {
    match severity {
        Some(Severity::Error) => Colors::ERROR,
        Some(Severity::Warn) | Some(Severity::Recommended) | Some(Severity::All) => Colors::WARN,
        Some(Severity::Info) => Colors::INFO,
        Some(Severity::Hint) => Colors::HINT,
        Some(Severity::Off) | None => Colors::DIM,
    }
}

/// Write a resolved ruleset to stdout in the requested format.
pub fn print_ruleset(ruleset: &ResolvedRuleset, format: OutputFormat) -> Result<()> {
    let mut stdout = io::stdout();
    match format {
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(ruleset).context("failed to encode ruleset as JSON")?;
            writeln!(stdout, "{text}")?;
        }
        OutputFormat::Yaml => {
            let text = serde_yaml::to_string(ruleset).context("failed to encode ruleset as YAML")?;
            write!(stdout, "{text}")?;
        }
        OutputFormat::Summary => print_summary(&mut stdout, ruleset)?,
    }
    Ok(())
}

fn print_summary(out: &mut impl Write, ruleset: &ResolvedRuleset) -> Result<()> {
    let enabled = ruleset.enabled_rules().count();
    header(out, &format!("Rules ({enabled} enabled, {} total)", ruleset.rules.len()))?;
    for (name, rule) in &ruleset.rules {
        let level = rule.severity.map(|s| s.as_str()).unwrap_or("-");
        execute!(
            out,
            SetForegroundColor(severity_color(rule.severity)),
            Print(format!("  {level:<12}")),
            ResetColor,
            Print(format!("{name}\n"))
        )?;
    }

    if !ruleset.functions.is_empty() {
        header(out, &format!("Functions ({})", ruleset.functions.len()))?;
        for function in ruleset.functions.values() {
            execute!(
                out,
                Print(format!("  {:<24}", function.name)),
                SetForegroundColor(Colors::DIM),
                Print(format!("{}\n", function.source)),
                ResetColor
            )?;
        }
    }

    if !ruleset.exceptions.is_empty() {
        header(out, &format!("Exceptions ({})", ruleset.exceptions.len()))?;
        for (target, names) in &ruleset.exceptions {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            writeln!(out, "  {target}: {}", names.join(", "))?;
        }
    }
    Ok(())
}

fn header(out: &mut impl Write, title: &str) -> Result<()> {
    execute!(
        out,
        SetForegroundColor(Colors::HEADER),
        Print(format!("{title}\n")),
        ResetColor
    )?;
    Ok(())
}

/// Print validation findings to stderr.
pub fn print_validation(file: &str, result: &ValidationResult) -> Result<()> {
    let mut stderr = io::stderr();
    for error in &result.errors {
        let location = if error.path.is_empty() { "(root)" } else { error.path.as_str() };
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print("error"),
            ResetColor,
            Print(format!(" {file}: {location}: {}", error.message))
        )?;
        match &error.suggestion {
            Some(suggestion) => writeln!(stderr, " ({suggestion})")?,
            None => writeln!(stderr)?,
        }
    }
    for warning in &result.warnings {
        execute!(
            stderr,
            SetForegroundColor(Colors::WARN),
            Print("warning"),
            ResetColor,
            Print(format!(" {file}: {}: {}\n", warning.path, warning.message))
        )?;
    }
    Ok(())
}
