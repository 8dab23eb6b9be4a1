//! Tests for the virtual module loader.

use serde_json::json;

use super::*;

fn modules(entries: Vec<(&str, ModuleNode)>) -> GeneratedModules {
    entries
        .into_iter()
        .map(|(id, body)| (id.to_string(), ModuleSource::new(body)))
        .collect()
}

#[test]
fn instantiate_object_with_links_and_arrays() {
    let sources = modules(vec![
        (
            "/rules/main.yaml",
            ModuleNode::object([
                ("extends", ModuleNode::call(CREATE_ARRAY, vec![ModuleNode::primitive("./base.yaml")])),
                ("rules", ModuleNode::link("/rules/shared.yaml", Some("/rules".into()))),
            ]),
        ),
        (
            "/rules/shared.yaml",
            ModuleNode::literal(&json!({"rules": {"a": {"severity": "warn"}}})),
        ),
    ]);

    let mut loader = ModuleLoader::new(sources);
    let value = loader.instantiate_value("/rules/main.yaml").unwrap();
    assert_eq!(
        value,
        json!({
            "extends": ["./base.yaml"],
            "rules": {"a": {"severity": "warn"}}
        })
    );
    assert!(loader.is_cached("/rules/shared.yaml"));
}

#[test]
fn repeat_requests_hit_cache() {
    let sources = modules(vec![("m", ModuleNode::primitive(1))]);
    let mut loader = ModuleLoader::new(sources);
    assert!(!loader.is_cached("m"));
    assert_eq!(loader.instantiate_value("m").unwrap(), json!(1));
    assert!(loader.is_cached("m"));
    assert_eq!(loader.instantiate_value("m").unwrap(), json!(1));
}

#[test]
fn null_body_is_still_an_export() {
    let sources = modules(vec![("empty", ModuleNode::primitive(serde_json::Value::Null))]);
    let mut loader = ModuleLoader::new(sources);
    assert_eq!(loader.instantiate_value("empty").unwrap(), serde_json::Value::Null);
    assert!(loader.is_cached("empty"));
}

#[test]
fn unknown_module_is_not_found() {
    let mut loader = ModuleLoader::new(GeneratedModules::new());
    let err = loader.instantiate("/nowhere.yaml").unwrap_err();
    assert!(matches!(err, ModuleError::NotFound(ref id) if id == "/nowhere.yaml"));
    assert!(err.to_string().contains("/nowhere.yaml"));
}

#[test]
fn builtins_resolve_before_generated_sources() {
    let sources = modules(vec![(CREATE_ARRAY, ModuleNode::primitive("shadowed"))]);
    let mut loader = ModuleLoader::new(sources);
    assert!(matches!(loader.instantiate(CREATE_ARRAY).unwrap(), ModuleExport::Helper(_)));
    assert!(matches!(
        loader.instantiate_value(CREATE_ARRAY).unwrap_err(),
        ModuleError::NotAValue(_)
    ));
}

#[test]
fn calling_a_value_module_fails() {
    let sources = modules(vec![
        ("main", ModuleNode::call("data", vec![])),
        ("data", ModuleNode::primitive(true)),
    ]);
    let mut loader = ModuleLoader::new(sources);
    assert!(matches!(
        loader.instantiate("main").unwrap_err(),
        ModuleError::NotCallable(ref id) if id == "data"
    ));
}

#[test]
fn circular_links_are_reported() {
    let sources = modules(vec![
        ("a", ModuleNode::object([("b", ModuleNode::link("b", None))])),
        ("b", ModuleNode::object([("a", ModuleNode::link("a", None))])),
    ]);
    let mut loader = ModuleLoader::new(sources);
    match loader.instantiate("a").unwrap_err() {
        ModuleError::Circular(chain) => assert_eq!(chain, vec!["a", "b", "a"]),
        other => panic!("expected circular error, got {other}"),
    }
}

#[test]
fn dangling_pointer_is_reported() {
    let sources = modules(vec![
        ("main", ModuleNode::link("data", Some("/missing".into()))),
        ("data", ModuleNode::literal(&json!({"present": 1}))),
    ]);
    let mut loader = ModuleLoader::new(sources);
    assert!(matches!(
        loader.instantiate("main").unwrap_err(),
        ModuleError::InvalidPointer { ref pointer, .. } if pointer == "/missing"
    ));
}

#[test]
fn custom_helpers_can_be_registered() {
    fn count(args: Vec<serde_json::Value>) -> Result<serde_json::Value, ModuleError> {
        Ok(json!(args.len()))
    }
    let mut builtins = Builtins::default();
    builtins.register("@rulekit/runtime/count", count);

    let sources = modules(vec![(
        "main",
        ModuleNode::call("@rulekit/runtime/count", vec![ModuleNode::primitive(1), ModuleNode::primitive(2)]),
    )]);
    let mut loader = ModuleLoader::with_builtins(sources, builtins);
    assert_eq!(loader.instantiate_value("main").unwrap(), json!(2));
}

#[test]
fn module_source_decodes_from_json_text() {
    let text = r#"{"body": {"type": "object", "entries": [
        ["rules", {"type": "link", "module": "shared", "pointer": "/rules"}],
        ["formats", {"type": "call", "helper": "@rulekit/runtime/create-array", "args": [
            {"type": "primitive", "value": "oas3"}
        ]}]
    ]}}"#;
    let main = ModuleSource::from_json(text).unwrap();
    let mut sources = GeneratedModules::new();
    sources.insert("main".into(), main);
    sources.insert(
        "shared".into(),
        ModuleSource::new(ModuleNode::literal(&json!({"rules": {"x": {}}}))),
    );

    let mut loader = ModuleLoader::new(sources);
    assert_eq!(
        loader.instantiate_value("main").unwrap(),
        json!({"rules": {"x": {}}, "formats": ["oas3"]})
    );
}
