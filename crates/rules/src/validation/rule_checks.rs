//! Rule entry validation: definitions, toggles, severities, formats.

use serde_json::{Map, Value};

use super::{type_name, validate_severity_keyword, validate_string_list, ValidationResult};
use crate::schema::RULE_LEVELS;

pub fn validate_rules(rules: &Value, result: &mut ValidationResult) {
    let Some(map) = rules.as_object() else {
        result.error("rules", format!("rules must be a mapping, got {}", type_name(rules)));
        return;
    };
    for (name, rule) in map {
        let path = format!("rules.{name}");
        match rule {
            Value::Bool(_) => {}
            Value::String(level) => validate_severity_keyword(level, RULE_LEVELS, &path, result),
            Value::Object(def) => validate_definition(def, &path, result),
            other => result.error(
                path,
                format!(
                    "rule must be a definition, a boolean or a severity, got {}",
                    type_name(other)
                ),
            ),
        }
    }
}

fn validate_definition(def: &Map<String, Value>, path: &str, result: &mut ValidationResult) {
    if let Some(given) = def.get("given") {
        let ok = match given {
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_string),
            _ => false,
        };
        if !ok {
            result.error(format!("{path}.given"), "given must be a path expression or a list of them");
        }
    }

    if let Some(then) = def.get("then") {
        validate_then(then, &format!("{path}.then"), result);
    }

    match def.get("severity") {
        None => {}
        Some(Value::String(level)) => {
            validate_severity_keyword(level, RULE_LEVELS, &format!("{path}.severity"), result)
        }
        Some(other) => result.error(
            format!("{path}.severity"),
            format!("severity must be a string, got {}", type_name(other)),
        ),
    }

    if let Some(recommended) = def.get("recommended") {
        if !recommended.is_boolean() {
            result.error(format!("{path}.recommended"), "recommended must be a boolean");
        }
    }

    if let Some(formats) = def.get("formats") {
        validate_string_list(formats, &format!("{path}.formats"), result);
    }
}

fn validate_then(then: &Value, path: &str, result: &mut ValidationResult) {
    match then {
        Value::Object(clause) => validate_then_clause(clause, path, result),
        Value::Array(clauses) if !clauses.is_empty() => {
            for (i, clause) in clauses.iter().enumerate() {
                match clause.as_object() {
                    Some(clause) => validate_then_clause(clause, &format!("{path}[{i}]"), result),
                    None => result.error(format!("{path}[{i}]"), "then clause must be a mapping"),
                }
            }
        }
        _ => result.error(path, "then must be a mapping or a non-empty list of mappings"),
    }
}

fn validate_then_clause(clause: &Map<String, Value>, path: &str, result: &mut ValidationResult) {
    match clause.get("function") {
        Some(Value::String(name)) if !name.is_empty() => {}
        Some(_) => result.error(format!("{path}.function"), "function must be a non-empty string"),
        None => result.error(format!("{path}.function"), "then clause is missing 'function'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(rules: Value) -> ValidationResult {
        let mut result = ValidationResult::new();
        validate_rules(&rules, &mut result);
        result
    }

    #[test]
    fn toggles_are_accepted() {
        let result = check(json!({"a": true, "b": false, "c": "off", "d": "error"}));
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn policy_keywords_are_not_rule_levels() {
        let result = check(json!({"a": "recommended"}));
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "rules.a");
    }

    #[test]
    fn misspelled_severity_gets_suggestion() {
        let result = check(json!({
            "a": {"given": "$", "then": {"function": "truthy"}, "severity": "warning"}
        }));
        let err = &result.errors[0];
        assert_eq!(err.path, "rules.a.severity");
        assert_eq!(err.suggestion.as_deref(), Some("Did you mean 'warn'?"));
    }

    #[test]
    fn severity_only_definition_is_accepted() {
        let result = check(json!({"a": {"severity": "warn"}, "b": {}}));
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn given_and_then_are_checked_when_present() {
        let result = check(json!({"a": {"given": "", "then": []}}));
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["rules.a.given", "rules.a.then"]);
    }

    #[test]
    fn then_list_clauses_need_functions() {
        let result = check(json!({
            "a": {"given": ["$.a", "$.b"], "then": [{"function": "truthy"}, {"field": "x"}]}
        }));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "rules.a.then[1].function");
    }

    #[test]
    fn recommended_and_formats_types() {
        let result = check(json!({
            "a": {"given": "$", "then": {"function": "f"}, "recommended": "yes", "formats": "oas3"}
        }));
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"rules.a.recommended"));
        assert!(paths.contains(&"rules.a.formats"));
    }

    #[test]
    fn rules_must_be_a_mapping() {
        let result = check(json!(["a"]));
        assert_eq!(result.errors[0].path, "rules");
    }
}
