//! Merge engine: folding a ruleset's contributions into the accumulator.
//!
//! Every merge is last-writer-wins per key and order-sensitive. Callers merge
//! parents in `extends` declaration order before the ruleset's own fields.

use tracing::warn;

use crate::identity::Location;
use crate::schema::{ExceptionTable, FunctionTable, RuleEntry, RuleSpec, RuleTable, Severity};

/// Write every incoming rule into `target`, applying `severity` as the
/// inheritance policy.
///
/// - forced levels (`off|error|warn|info|hint`) overwrite every rule;
/// - `recommended` keeps a rule's own severity, stores `recommended` when it
///   has none, and turns rules marked `recommended: false` off;
/// - `all` keeps own severities and stores `recommended` otherwise.
///
/// Toggles adjust a rule already in `target`; a toggle for an unknown rule is
/// skipped with a warning.
pub fn merge_rules<I>(target: &mut RuleTable, incoming: I, severity: Severity)
where
    I: IntoIterator<Item = (String, RuleSpec)>,
{
    for (name, spec) in incoming {
        match spec {
            RuleSpec::Definition(mut entry) => {
                apply_policy(&mut entry, severity);
                target.insert(name, entry);
            }
            RuleSpec::Toggle(enabled) => {
                let level = if enabled { None } else { Some(Severity::Off) };
                toggle(target, &name, level, severity);
            }
            RuleSpec::Level(level) if level.is_forced() => toggle(target, &name, Some(level), severity),
            RuleSpec::Level(_) => toggle(target, &name, None, severity),
        }
    }
}

/// Merge the flattened rules of an already resolved parent.
pub fn merge_resolved_rules(target: &mut RuleTable, incoming: RuleTable, severity: Severity) {
    merge_rules(
        target,
        incoming
            .into_iter()
            .map(|(name, entry)| (name, RuleSpec::Definition(entry))),
        severity,
    );
}

fn apply_policy(entry: &mut RuleEntry, severity: Severity) {
    if entry.declared.is_none() {
        entry.declared = Some(entry.severity.unwrap_or(Severity::Recommended));
    }
    match severity {
        forced if forced.is_forced() => entry.severity = Some(forced),
        Severity::Recommended if entry.recommended == Some(false) => entry.severity = Some(Severity::Off),
        _ => {
            entry.severity.get_or_insert(Severity::Recommended);
        }
    }
}

/// `level == None` re-enables the rule at its declared severity.
fn toggle(target: &mut RuleTable, name: &str, level: Option<Severity>, severity: Severity) {
    let Some(entry) = target.get_mut(name) else {
        warn!(rule = %name, "toggle targets a rule that is not defined; skipped");
        return;
    };
    entry.severity = Some(match (severity.is_forced(), level) {
        (true, _) => severity,
        (false, Some(level)) => level,
        (false, None) => match (entry.severity, entry.declared) {
            (Some(current), _) if current != Severity::Off => current,
            (_, Some(declared)) if declared != Severity::Off => declared,
            _ => Severity::Recommended,
        },
    });
}

/// Union `incoming` functions into `target`.
///
/// Returns the incoming function names no rule in `rules` references; each is
/// logged as a warning.
pub fn merge_functions(target: &mut FunctionTable, incoming: FunctionTable, rules: &RuleTable) -> Vec<String> {
    let unreferenced: Vec<String> = incoming
        .keys()
        .filter(|name| {
            !rules
                .values()
                .any(|rule| rule.referenced_functions().contains(&name.as_str()))
        })
        .cloned()
        .collect();

    for name in &unreferenced {
        warn!(function = %name, "function is not referenced by any rule");
    }

    target.extend(incoming);
    unreferenced
}

/// Union exception entries into `target`, rewriting relative targets against `scope`.
pub fn merge_exceptions<I, N>(target: &mut ExceptionTable, incoming: I, scope: &Location)
where
    I: IntoIterator<Item = (String, N)>,
    N: IntoIterator<Item = String>,
{
    for (locator, names) in incoming {
        target.entry(scope.scope_target(&locator)).or_default().extend(names);
    }
}

/// Annotate every rule that has no format filter of its own with `formats`.
pub fn merge_formats(rules: &mut RuleTable, formats: &[String]) {
    if formats.is_empty() {
        return;
    }
    for rule in rules.values_mut() {
        if rule.formats.is_none() {
            rule.formats = Some(formats.to_vec());
        }
    }
}

#[cfg(test)]
mod tests;
