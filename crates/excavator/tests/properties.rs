use excavator_core_types::{Category, ObjectRef, Relation, Value};
use excavator_engine::{
    excavate, ExcavateOptions, ExcavationInput, ExcavationResult, Excavator, ValueNode,
    DOM_ROOT_ID, FUNCTION_BODY_DISABLED,
};
use dom_inspector::{Html, DOM_SHEET_ID};
use pretty_assertions::assert_eq;
use serde_json::json;

fn from_json(json: serde_json::Value) -> Value {
    Value::from_json(&json)
}

fn shape(result: &ExcavationResult) -> (Vec<(Category, String)>, Vec<(String, String, Relation)>) {
    let records = result
        .virtual_objects
        .iter()
        .map(|r| (r.category, r.signature.clone()))
        .collect();
    let edges = result
        .relationships
        .iter()
        .map(|e| (e.from.clone(), e.to.clone(), e.relation))
        .collect();
    (records, edges)
}

#[test]
fn self_reference_terminates_with_one_cycle_sentinel() {
    let a = ObjectRef::new();
    a.insert("self", Value::Object(a.clone()));

    let result = excavate(ExcavationInput::value(Value::Object(a)));

    assert_eq!(result.records_of(Category::Struct).count(), 1);
    assert_eq!(result.summary.truncation.cycles, 1);
    match result.root.find("root.self") {
        Some(ValueNode::Cycle { .. }) => {}
        other => panic!("expected cycle sentinel, got {other:?}"),
    }
    let fields = &result.record("root").unwrap().meta["fields"];
    assert_eq!(fields["self"]["kind"], "cycle");
    assert_eq!(fields["self"]["note"], "already visited");
    assert_eq!(result.summary.truncation.shared_references, 0);
}

#[test]
fn shared_value_is_marked_as_a_shared_reference_not_a_cycle() {
    let shared = ObjectRef::new();
    shared.insert("n", Value::Number(1.0));
    let root = ObjectRef::new();
    root.insert("a", Value::Object(shared.clone()));
    root.insert("b", Value::Object(shared));

    let result = excavate(ExcavationInput::value(Value::Object(root)));

    assert_eq!(result.summary.truncation.cycles, 0);
    assert_eq!(result.summary.truncation.shared_references, 1);
    assert!(matches!(result.root.find("root.a"), Some(ValueNode::Object { .. })));
    match result.root.find("root.b") {
        Some(ValueNode::Cycle { shared, .. }) => assert!(*shared),
        other => panic!("expected shared sentinel, got {other:?}"),
    }
    let fields = &result.record("root").unwrap().meta["fields"];
    assert_eq!(fields["b"]["kind"], "cycle");
    assert_eq!(fields["b"]["note"], "shared reference");
}

#[test]
fn self_containing_array_is_a_cycle_too() {
    let array = excavator_core_types::ArrayRef::new(vec![Value::Number(1.0)]);
    array.push(Value::Array(array.clone()));

    let result = excavate(ExcavationInput::value(Value::Array(array)));
    assert!(matches!(
        result.root.find("root[1]"),
        Some(ValueNode::Cycle { .. })
    ));
    assert_eq!(result.records_of(Category::Collection).count(), 1);
}

#[test]
fn repeated_calls_are_deterministic() {
    let input = || from_json(json!({"x": 1, "y": [1, 2]}));
    let first = excavate(ExcavationInput::value(input()));
    let second = excavate(ExcavationInput::value(input()));

    assert_eq!(shape(&first), shape(&second));
    assert_eq!(first.fingerprint, second.fingerprint);
    assert!(first.fingerprint.starts_with("sha256_"));
}

#[test]
fn eleven_elements_sample_ten() {
    let value = from_json(json!([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));
    let result = Excavator::new(ExcavateOptions {
        max_array_sample: 10,
        ..ExcavateOptions::default()
    })
    .excavate(ExcavationInput::value(value));

    let collection = result.record("root").unwrap();
    assert_eq!(collection.category, Category::Collection);
    assert_eq!(collection.meta["length"], 11);
    assert_eq!(collection.meta["sampled"], 10);
    match &result.root {
        ValueNode::Array {
            length,
            sampled,
            children,
            ..
        } => {
            assert_eq!((*length, *sampled, children.len()), (11, 10, 10));
        }
        other => panic!("expected array descriptor, got {other:?}"),
    }
    assert_eq!(result.summary.truncation.sampled_arrays, 1);
}

fn max_descriptor_depth(node: &ValueNode, depth: usize) -> usize {
    node.children()
        .into_iter()
        .map(|child| max_descriptor_depth(child, depth + 1))
        .max()
        .unwrap_or(depth)
}

fn find_depth_limit(node: &ValueNode, depth: usize) -> Option<usize> {
    if let ValueNode::DepthLimit { depth: at, .. } = node {
        assert_eq!(*at, depth);
        return Some(depth);
    }
    node.children()
        .into_iter()
        .find_map(|child| find_depth_limit(child, depth + 1))
}

#[test]
fn nesting_beyond_max_depth_ends_in_a_depth_limit_sentinel() {
    let mut value = Value::Number(0.0);
    for _ in 0..20 {
        value = Value::object([("next", value)]);
    }
    let result = Excavator::new(ExcavateOptions {
        max_depth: 6,
        ..ExcavateOptions::default()
    })
    .excavate(ExcavationInput::value(value));

    assert_eq!(find_depth_limit(&result.root, 0), Some(7));
    assert_eq!(max_descriptor_depth(&result.root, 0), 7);
    assert_eq!(result.summary.truncation.depth_limited, 1);
    assert_eq!(result.summary.max_depth_reached, 7);
    assert_eq!(result.records_of(Category::Struct).count(), 7);
}

#[test]
fn end_to_end_object_with_array() {
    let result = excavate(ExcavationInput::value(from_json(json!({"a": 1, "b": [1, 2, 3]}))));

    let structs: Vec<_> = result.records_of(Category::Struct).collect();
    assert_eq!(structs.len(), 1);
    assert_eq!(structs[0].id, "root");
    let fields = structs[0].meta["fields"].as_object().unwrap();
    let mut keys: Vec<&String> = fields.keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(fields["a"]["example"], 1);

    let collections: Vec<_> = result.records_of(Category::Collection).collect();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].id, "root.b");
    assert_eq!(collections[0].meta["elementKinds"], json!(["primitive"]));
    assert_eq!(collections[0].meta["length"], 3);
    assert_eq!(collections[0].meta["sampled"], 3);

    let edges: Vec<(&str, &str, Relation)> = result
        .relationships
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str(), e.relation))
        .collect();
    assert_eq!(
        edges,
        vec![
            ("root", "root.a", Relation::Field),
            ("root", "root.b", Relation::Field),
        ]
    );
}

#[test]
fn functions_note_disabled_body_inspection() {
    let value = Value::object([("handler", Value::function("onClick", 2))]);
    let result = excavate(ExcavationInput::value(value));
    match result.root.find("root.handler") {
        Some(ValueNode::Function {
            name, arity, note, ..
        }) => {
            assert_eq!(name, "onClick");
            assert_eq!(*arity, 2);
            assert_eq!(note.as_deref(), Some(FUNCTION_BODY_DISABLED));
        }
        other => panic!("expected function descriptor, got {other:?}"),
    }
}

#[test]
fn exotic_values_become_unknown_descriptors() {
    let result = excavate(ExcavationInput::value(Value::object([(
        "proxy",
        Value::opaque("Proxy"),
    )])));
    match result.root.find("root.proxy") {
        Some(ValueNode::Unknown { value_type, .. }) => assert_eq!(value_type, "Proxy"),
        other => panic!("expected unknown descriptor, got {other:?}"),
    }
}

#[test]
fn long_strings_are_truncated_and_flagged() {
    let long = "x".repeat(500);
    let result = excavate(ExcavationInput::value(Value::object([(
        "text",
        Value::string(long),
    )])));
    match result.root.find("root.text") {
        Some(ValueNode::Primitive {
            example, truncated, ..
        }) => {
            assert!(*truncated);
            assert_eq!(example.as_str().map(str::len), Some(120));
        }
        other => panic!("expected primitive descriptor, got {other:?}"),
    }
    assert_eq!(result.summary.truncation.truncated_strings, 1);
}

#[test]
fn dom_is_merged_under_the_nominal_root() {
    let html = Html::parse_document(
        r#"<div class="btn">a</div><div class="btn">b</div><span class="btn">c</span>"#,
    );
    let result = excavate(ExcavationInput::value(from_json(json!({"k": true}))).with_document(&html));

    assert_eq!(result.dom_sheets.len(), 1);
    let div = result.record("dom:tag:div").unwrap();
    assert_eq!(div.meta["count"], 2);
    assert_eq!(result.record("dom:class:btn").unwrap().meta["count"], 3);
    assert!(result.relationships.iter().any(|e| e.from == DOM_ROOT_ID
        && e.to == DOM_SHEET_ID
        && e.relation == Relation::Summarizes));
    assert!(result.style_report.is_none());
}

#[test]
fn style_layer_is_opt_in() {
    let html = Html::parse_document(
        r#"<html><head><style>.btn { color: red }</style></head><body><b class="btn"></b></body></html>"#,
    );
    let result = Excavator::new(ExcavateOptions {
        inspect_styles: true,
        ..ExcavateOptions::default()
    })
    .excavate(ExcavationInput::document(&html));

    assert!(result.style_report.is_some());
    assert_eq!(result.records_of(Category::CssStylesheet).count(), 1);
    assert_eq!(result.records_of(Category::CssStyleRule).count(), 1);
    assert!(matches!(result.root, ValueNode::Undefined { .. }));
}

#[test]
fn result_serializes_with_camel_case_and_kebab_kinds() {
    let result = excavate(ExcavationInput::value(from_json(json!({"a": null}))));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["root"]["kind"], "object");
    assert_eq!(json["root"]["fields"][0]["node"]["kind"], "null");
    assert_eq!(json["virtualObjects"][0]["category"], "struct");
    assert_eq!(json["summary"]["categories"]["struct"], 1);
}
