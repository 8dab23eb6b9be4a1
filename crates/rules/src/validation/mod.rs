//! Structural validation of instantiated ruleset documents.
//!
//! Runs after reference resolution and before typed deserialization, so every
//! error carries a JSON-path-like location into the document. Returns a
//! [`ValidationResult`] with errors (reject the ruleset) and warnings (advisory).

mod rule_checks;

pub mod fuzzy;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::SEVERITY_KEYWORDS;
use fuzzy::fuzzy_match;

/// Keys a ruleset document may carry at the top level.
pub(crate) const TOP_LEVEL_KEYS: &[&str] = &[
    "extends",
    "rules",
    "functions",
    "functionsDir",
    "formats",
    "except",
    "description",
    "documentationUrl",
];

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON-path-like location, e.g. `"rules.no-eval.severity"`.
    pub path: String,
    pub message: String,
    /// Optional "Did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate the shape of an instantiated ruleset document.
pub fn validate_ruleset(value: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    let Some(root) = value.as_object() else {
        result.error("", format!("ruleset must be a mapping, got {}", type_name(value)));
        return result;
    };

    validate_keys(root, &mut result);
    if let Some(extends) = root.get("extends") {
        validate_extends(extends, &mut result);
    }
    if let Some(rules) = root.get("rules") {
        rule_checks::validate_rules(rules, &mut result);
    }
    if let Some(functions) = root.get("functions") {
        validate_functions(functions, &mut result);
    }
    if let Some(dir) = root.get("functionsDir") {
        if !dir.is_string() {
            result.error("functionsDir", "functionsDir must be a string");
        }
    }
    if let Some(formats) = root.get("formats") {
        validate_string_list(formats, "formats", &mut result);
    }
    if let Some(except) = root.get("except") {
        validate_except(except, &mut result);
    }
    result
}

/// Parse raw YAML and validate. Parse errors are reported as validation errors.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(value) => validate_ruleset(&value),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}

// ── Sections ────────────────────────────────────────────────────────

fn validate_keys(root: &Map<String, Value>, result: &mut ValidationResult) {
    for key in root.keys() {
        if TOP_LEVEL_KEYS.contains(&key.as_str()) {
            continue;
        }
        match fuzzy_match(key, TOP_LEVEL_KEYS) {
            Some(s) => result.warn(key.clone(), format!("Unknown key '{key}'. Did you mean '{s}'?")),
            None => result.warn(key.clone(), format!("Unknown key '{key}' is ignored")),
        }
    }
}

fn validate_extends(extends: &Value, result: &mut ValidationResult) {
    match extends {
        Value::String(_) => {}
        Value::Array(items) if is_severity_pair(items) => {}
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let path = format!("extends[{i}]");
                match item {
                    Value::String(_) => {}
                    Value::Array(pair) => validate_extends_pair(pair, &path, result),
                    other => result.error(
                        path,
                        format!("extends entry must be a string or [locator, severity], got {}", type_name(other)),
                    ),
                }
            }
        }
        other => result.error(
            "extends",
            format!("extends must be a string or a list, got {}", type_name(other)),
        ),
    }
}

fn is_severity_pair(items: &[Value]) -> bool {
    matches!(items, [Value::String(_), Value::String(level)] if SEVERITY_KEYWORDS.contains(&level.as_str()))
}

fn validate_extends_pair(pair: &[Value], path: &str, result: &mut ValidationResult) {
    match pair {
        [Value::String(_), Value::String(level)] => validate_severity_keyword(level, SEVERITY_KEYWORDS, &format!("{path}[1]"), result),
        _ => result.error(path, "extends pair must be [locator, severity]"),
    }
}

fn validate_functions(functions: &Value, result: &mut ValidationResult) {
    let Some(items) = functions.as_array() else {
        result.error("functions", format!("functions must be a list, got {}", type_name(functions)));
        return;
    };
    for (i, item) in items.iter().enumerate() {
        let path = format!("functions[{i}]");
        match item {
            Value::String(name) if name.is_empty() => result.error(path, "function name must not be empty"),
            Value::String(_) => {}
            Value::Array(pair) => match pair.as_slice() {
                [Value::String(_), Value::Object(_)] => {}
                _ => result.error(path, "function declaration must be a name or [name, schema]"),
            },
            other => result.error(
                path,
                format!("function declaration must be a string or [name, schema], got {}", type_name(other)),
            ),
        }
    }
}

fn validate_except(except: &Value, result: &mut ValidationResult) {
    let Some(map) = except.as_object() else {
        result.error("except", format!("except must be a mapping, got {}", type_name(except)));
        return;
    };
    for (target, names) in map {
        let path = format!("except.{target}");
        match names.as_array() {
            Some(list) if list.is_empty() => result.error(path, "exception must list at least one rule"),
            Some(_) => validate_string_list(names, &path, result),
            None => result.error(path, "exception must be a list of rule names"),
        }
    }
}

// ── Shared helpers ──────────────────────────────────────────────────

pub(crate) fn validate_string_list(value: &Value, path: &str, result: &mut ValidationResult) {
    match value.as_array() {
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                if !item.is_string() {
                    result.error(format!("{path}[{i}]"), format!("expected a string, got {}", type_name(item)));
                }
            }
        }
        None => result.error(path, format!("expected a list of strings, got {}", type_name(value))),
    }
}

pub(crate) fn validate_severity_keyword(
    level: &str,
    allowed: &[&str],
    path: &str,
    result: &mut ValidationResult,
) {
    if allowed.contains(&level) {
        return;
    }
    match fuzzy_match(level, allowed) {
        Some(s) => result.error_with_suggestion(
            path,
            format!("Unknown severity '{level}'"),
            format!("Did you mean '{s}'?"),
        ),
        None => result.error(
            path,
            format!("Unknown severity '{level}', expected one of: {}", allowed.join(", ")),
        ),
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_at(result: &ValidationResult, path: &str) -> usize {
        result.errors.iter().filter(|e| e.path == path).count()
    }

    #[test]
    fn valid_ruleset_passes() {
        let result = validate_yaml(
            r#"
extends: [[./base.yaml, off], ./other.yaml]
formats: [oas3]
functions: [casing, [params, {type: object}]]
functionsDir: lib
rules:
  op-tags:
    severity: warn
    given: $.paths
    then: {function: truthy}
  inherited: off
  other: false
except:
  "api.yaml#/info": [op-tags]
"#,
        );
        assert!(result.valid, "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn non_mapping_root_is_error() {
        let result = validate_yaml("- a\n- b\n");
        assert!(!result.valid);
        assert!(result.errors[0].message.contains("mapping"));
    }

    #[test]
    fn top_level_severity_pair_is_accepted() {
        assert!(validate_yaml("extends: [ruleset-b.yaml, off]\n").valid);
    }

    #[test]
    fn bad_extends_pair_severity_suggests() {
        let result = validate_yaml("extends: [[./a.yaml, eror]]\n");
        assert!(!result.valid);
        let err = &result.errors[0];
        assert_eq!(err.path, "extends[0][1]");
        assert!(err.suggestion.as_deref().unwrap().contains("error"));
    }

    #[test]
    fn extends_of_wrong_type() {
        let result = validate_yaml("extends: 3\n");
        assert_eq!(errors_at(&result, "extends"), 1);
    }

    #[test]
    fn function_declarations_checked() {
        let result = validate_yaml("functions: [ok, [bad], 5]\n");
        assert_eq!(errors_at(&result, "functions[1]"), 1);
        assert_eq!(errors_at(&result, "functions[2]"), 1);
        assert_eq!(errors_at(&result, "functions[0]"), 0);
    }

    #[test]
    fn except_requires_rule_lists() {
        let result = validate_yaml("except:\n  a.yaml: []\n  b.yaml: nope\n  c.yaml: [x, 1]\n");
        assert_eq!(errors_at(&result, "except.a.yaml"), 1);
        assert_eq!(errors_at(&result, "except.b.yaml"), 1);
        assert_eq!(errors_at(&result, "except.c.yaml[1]"), 1);
    }

    #[test]
    fn unknown_keys_warn_with_suggestion() {
        let result = validate_yaml("extend: ./a.yaml\nrules: {}\n");
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("extends"));
    }

    #[test]
    fn yaml_parse_error_is_reported() {
        let result = validate_yaml("rules: [unclosed\n");
        assert!(!result.valid);
        assert!(result.errors[0].message.starts_with("YAML parse error"));
    }
}
