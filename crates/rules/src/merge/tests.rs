//! Tests for the merge engine.

use serde_json::json;

use super::*;
use crate::schema::ResolvedFunction;

fn rule(value: serde_json::Value) -> RuleSpec {
    serde_json::from_value(value).unwrap()
}

fn entry(value: serde_json::Value) -> RuleEntry {
    serde_json::from_value(value).unwrap()
}

fn table(entries: Vec<(&str, RuleEntry)>) -> RuleTable {
    entries.into_iter().map(|(n, e)| (n.to_string(), e)).collect()
}

fn severity_of(rules: &RuleTable, name: &str) -> Option<Severity> {
    rules[name].severity
}

fn function(name: &str) -> ResolvedFunction {
    ResolvedFunction {
        name: name.to_string(),
        code: format!("export default function {name}() {{}}"),
        schema: None,
        source: format!("/rules/functions/{name}.js"),
    }
}

#[test]
fn forced_severity_overwrites_own_severity() {
    let mut target = RuleTable::new();
    merge_rules(
        &mut target,
        [
            ("a".to_string(), rule(json!({"severity": "warn", "given": "$"}))),
            ("b".to_string(), rule(json!({"given": "$"}))),
        ],
        Severity::Off,
    );
    assert_eq!(severity_of(&target, "a"), Some(Severity::Off));
    assert_eq!(severity_of(&target, "b"), Some(Severity::Off));
}

#[test]
fn recommended_keeps_own_and_fills_default() {
    let mut target = RuleTable::new();
    merge_rules(
        &mut target,
        [
            ("a".to_string(), rule(json!({"severity": "error"}))),
            ("b".to_string(), rule(json!({"given": "$"}))),
            ("c".to_string(), rule(json!({"severity": "warn", "recommended": false}))),
        ],
        Severity::Recommended,
    );
    assert_eq!(severity_of(&target, "a"), Some(Severity::Error));
    assert_eq!(severity_of(&target, "b"), Some(Severity::Recommended));
    assert_eq!(severity_of(&target, "c"), Some(Severity::Off));
}

#[test]
fn all_enables_non_recommended_rules() {
    let mut target = RuleTable::new();
    merge_rules(
        &mut target,
        [
            ("a".to_string(), rule(json!({"recommended": false}))),
            ("b".to_string(), rule(json!({"severity": "hint", "recommended": false}))),
        ],
        Severity::All,
    );
    assert_eq!(severity_of(&target, "a"), Some(Severity::Recommended));
    assert_eq!(severity_of(&target, "b"), Some(Severity::Hint));
}

#[test]
fn later_definition_replaces_earlier() {
    let mut target = table(vec![("r", entry(json!({"severity": "warn", "given": "$.a"})))]);
    merge_rules(
        &mut target,
        [("r".to_string(), rule(json!({"severity": "error", "given": "$.b"})))],
        Severity::Recommended,
    );
    assert_eq!(severity_of(&target, "r"), Some(Severity::Error));
    assert_eq!(target["r"].fields["given"], json!("$.b"));
}

#[test]
fn toggles_adjust_existing_rules() {
    let mut target = table(vec![
        ("on", entry(json!({"severity": "off"}))),
        ("off", entry(json!({"severity": "warn"}))),
        ("level", entry(json!({"severity": "warn"}))),
        ("kept", entry(json!({"severity": "info"}))),
    ]);
    merge_rules(
        &mut target,
        [
            ("on".to_string(), RuleSpec::Toggle(true)),
            ("off".to_string(), RuleSpec::Toggle(false)),
            ("level".to_string(), RuleSpec::Level(Severity::Error)),
            ("kept".to_string(), RuleSpec::Toggle(true)),
        ],
        Severity::Recommended,
    );
    assert_eq!(severity_of(&target, "on"), Some(Severity::Recommended));
    assert_eq!(severity_of(&target, "off"), Some(Severity::Off));
    assert_eq!(severity_of(&target, "level"), Some(Severity::Error));
    assert_eq!(severity_of(&target, "kept"), Some(Severity::Info));
}

#[test]
fn forced_severity_wins_over_toggles() {
    let mut target = table(vec![("r", entry(json!({"severity": "off"})))]);
    merge_rules(&mut target, [("r".to_string(), RuleSpec::Toggle(true))], Severity::Off);
    assert_eq!(severity_of(&target, "r"), Some(Severity::Off));
}

#[test]
fn reenabled_rule_restores_declared_severity() {
    let mut target = RuleTable::new();
    let parent = table(vec![
        ("r", entry(json!({"severity": "error", "given": "$"}))),
        ("quiet", entry(json!({"severity": "hint", "recommended": false}))),
        ("plain", entry(json!({"given": "$"}))),
    ]);
    merge_resolved_rules(&mut target, parent, Severity::Off);
    assert!(target.values().all(|rule| !rule.is_enabled()));

    merge_rules(
        &mut target,
        [
            ("r".to_string(), RuleSpec::Toggle(true)),
            ("quiet".to_string(), RuleSpec::Toggle(true)),
            ("plain".to_string(), RuleSpec::Toggle(true)),
        ],
        Severity::Recommended,
    );
    assert_eq!(severity_of(&target, "r"), Some(Severity::Error));
    assert_eq!(severity_of(&target, "quiet"), Some(Severity::Hint));
    assert_eq!(severity_of(&target, "plain"), Some(Severity::Recommended));
}

#[test]
fn declared_severity_survives_repeated_forcing() {
    let mut target = RuleTable::new();
    let base = table(vec![("r", entry(json!({"severity": "warn"})))]);
    merge_resolved_rules(&mut target, base, Severity::Off);

    let mut outer = RuleTable::new();
    merge_resolved_rules(&mut outer, target, Severity::Info);
    assert_eq!(severity_of(&outer, "r"), Some(Severity::Info));
    assert_eq!(outer["r"].declared, Some(Severity::Warn));
}

#[test]
fn toggle_for_unknown_rule_is_skipped() {
    let mut target = RuleTable::new();
    merge_rules(&mut target, [("ghost".to_string(), RuleSpec::Level(Severity::Warn))], Severity::Recommended);
    assert!(target.is_empty());
}

#[test]
fn resolved_rules_are_reforced() {
    let mut target = RuleTable::new();
    let parent = table(vec![("p", entry(json!({"severity": "error"})))]);
    merge_resolved_rules(&mut target, parent, Severity::Warn);
    assert_eq!(severity_of(&target, "p"), Some(Severity::Warn));
}

#[test]
fn unreferenced_functions_are_reported() {
    let rules = table(vec![("r", entry(json!({"then": [{"function": "used"}]})))]);
    let incoming: FunctionTable = [function("used"), function("spare")]
        .into_iter()
        .map(|f| (f.name.clone(), f))
        .collect();

    let mut target = FunctionTable::new();
    let unreferenced = merge_functions(&mut target, incoming, &rules);
    assert_eq!(unreferenced, vec!["spare".to_string()]);
    assert_eq!(target.len(), 2);
}

#[test]
fn exceptions_are_scoped_and_unioned() {
    let scope = Location::dir("/project/rules");
    let mut target = ExceptionTable::new();
    merge_exceptions(
        &mut target,
        [("../api.yaml#/paths".to_string(), vec!["b".to_string(), "a".to_string()])],
        &scope,
    );
    merge_exceptions(
        &mut target,
        [("/project/api.yaml#/paths".to_string(), vec!["c".to_string(), "a".to_string()])],
        &scope,
    );

    let names: Vec<_> = target["/project/api.yaml#/paths"].iter().cloned().collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(target.len(), 1);
}

#[test]
fn formats_only_fill_missing_filters() {
    let mut rules = table(vec![
        ("plain", entry(json!({}))),
        ("pinned", entry(json!({"formats": ["oas2"]}))),
    ]);
    merge_formats(&mut rules, &["oas3".to_string()]);
    assert_eq!(rules["plain"].formats, Some(vec!["oas3".to_string()]));
    assert_eq!(rules["pinned"].formats, Some(vec!["oas2".to_string()]));

    merge_formats(&mut rules, &[]);
    assert_eq!(rules["plain"].formats, Some(vec!["oas3".to_string()]));
}
