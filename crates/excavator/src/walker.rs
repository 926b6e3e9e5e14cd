use std::collections::{BTreeMap, BTreeSet, HashSet};

use dom_inspector::truncate_chars;
use excavator_core_types::{
    classify, ArrayRef, Category, FunctionRef, ObjectRef, OpaqueRef, RelationshipEdge, Value,
    ValueKind, VirtualObjectRecord,
};
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::events;
use crate::model::{
    ObjectField, TruncationCounts, ValueNode, FUNCTION_BODY_DISABLED, FUNCTION_SOURCE_UNAVAILABLE,
};
use crate::policy::ExcavateOptions;

pub const ROOT_ID: &str = "root";

const IDENTITY_HINT_KEYS: [&str; 3] = ["id", "name", "type"];

/// State of a single excavation call. Never shared between calls.
pub(crate) struct Walk<'o> {
    options: &'o ExcavateOptions,
    visited: HashSet<usize>,
    ancestors: HashSet<usize>,
    pub(crate) virtual_objects: Vec<VirtualObjectRecord>,
    pub(crate) relationships: Vec<RelationshipEdge>,
    pub(crate) truncation: TruncationCounts,
    pub(crate) node_kinds: BTreeMap<String, usize>,
    pub(crate) max_depth_reached: usize,
}

impl<'o> Walk<'o> {
    pub(crate) fn new(options: &'o ExcavateOptions) -> Self {
        Self {
            options,
            visited: HashSet::new(),
            ancestors: HashSet::new(),
            virtual_objects: Vec::new(),
            relationships: Vec::new(),
            truncation: TruncationCounts::default(),
            node_kinds: BTreeMap::new(),
            max_depth_reached: 0,
        }
    }

    pub(crate) fn walk_root(&mut self, value: &Value) -> ValueNode {
        self.walk(value, ROOT_ID.to_string(), 0)
    }

    fn walk(&mut self, value: &Value, id: String, depth: usize) -> ValueNode {
        self.max_depth_reached = self.max_depth_reached.max(depth);
        let node = if depth > self.options.max_depth {
            self.truncation.depth_limited += 1;
            events::emit_depth_limit(&id, depth);
            ValueNode::DepthLimit {
                id,
                depth,
                value_type: value.type_tag(),
            }
        } else {
            match (classify(value), value) {
                (ValueKind::Null, _) => ValueNode::Null {
                    id,
                    value_type: value.type_tag(),
                },
                (ValueKind::Undefined, _) => ValueNode::Undefined {
                    id,
                    value_type: value.type_tag(),
                },
                (ValueKind::Primitive, _) => self.leaf(value, id),
                (ValueKind::Array, Value::Array(array)) => self.array(array, id, depth),
                (ValueKind::Object, Value::Object(object)) => self.object(object, id, depth),
                (ValueKind::Function, Value::Function(function)) => self.function(function, id),
                (_, Value::Opaque(opaque)) => unknown(opaque, id),
                _ => ValueNode::Unknown {
                    id,
                    value_type: value.type_tag(),
                    description: None,
                },
            }
        };
        *self.node_kinds.entry(node.kind().to_string()).or_default() += 1;
        node
    }

    fn leaf(&mut self, value: &Value, id: String) -> ValueNode {
        let (example, truncated) = match value {
            Value::Bool(flag) => (json!(flag), false),
            Value::Number(number) => (number_example(*number), false),
            Value::BigInt(number) => (json!(format!("{number}n")), false),
            Value::String(text) => {
                let (cut, truncated) = truncate_chars(text, self.options.max_string_example);
                (JsonValue::String(cut), truncated)
            }
            Value::Symbol(description) => {
                let (cut, truncated) =
                    truncate_chars(description, self.options.max_string_example);
                (json!(format!("Symbol({cut})")), truncated)
            }
            _ => (JsonValue::Null, false),
        };
        if truncated {
            self.truncation.truncated_strings += 1;
        }
        ValueNode::Primitive {
            id,
            value_type: value.type_tag(),
            example,
            truncated,
        }
    }

    /// Marks `identity` as entered, or returns the sentinel for a repeat.
    fn enter(&mut self, identity: usize, id: &str, value_type: &str) -> Option<ValueNode> {
        let shared = if self.ancestors.contains(&identity) {
            self.truncation.cycles += 1;
            false
        } else if !self.visited.insert(identity) {
            self.truncation.shared_references += 1;
            true
        } else {
            self.ancestors.insert(identity);
            return None;
        };
        events::emit_cycle(id, shared);
        Some(ValueNode::Cycle {
            id: id.to_string(),
            value_type: value_type.to_string(),
            shared,
        })
    }

    fn array(&mut self, array: &ArrayRef, id: String, depth: usize) -> ValueNode {
        if let Some(sentinel) = self.enter(array.identity(), &id, "array") {
            return sentinel;
        }
        let length = array.len();
        let items = array.sample(self.options.max_array_sample);
        let mut kinds = BTreeSet::new();
        let mut holes = Vec::new();
        let mut children = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let kind = classify(item);
            if matches!(kind, ValueKind::Null | ValueKind::Undefined) {
                holes.push(index);
            }
            kinds.insert(kind.as_str());
            children.push(self.walk(item, format!("{id}[{index}]"), depth + 1));
        }
        let sampled = children.len();
        if sampled < length {
            self.truncation.sampled_arrays += 1;
        }
        let element_kinds: Vec<String> = kinds.into_iter().map(str::to_string).collect();

        let mut meta = JsonMap::new();
        meta.insert("length".into(), json!(length));
        meta.insert("sampled".into(), json!(sampled));
        meta.insert("elementKinds".into(), json!(element_kinds));
        meta.insert("holes".into(), json!(holes));
        self.virtual_objects.push(VirtualObjectRecord::new(
            id.clone(),
            Category::Collection,
            format!("array<{}>", element_kinds.join("|")),
            meta,
        ));
        self.ancestors.remove(&array.identity());

        ValueNode::Array {
            id,
            length,
            sampled,
            element_kinds,
            holes,
            children,
        }
    }

    fn object(&mut self, object: &ObjectRef, id: String, depth: usize) -> ValueNode {
        let value_type = Value::Object(object.clone()).type_tag();
        if let Some(sentinel) = self.enter(object.identity(), &id, &value_type) {
            return sentinel;
        }
        let entries = object.entries();
        let mut fields = Vec::with_capacity(entries.len());
        let mut field_meta = JsonMap::new();
        let mut shape = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            let child_id = field_id(&id, key);
            let node = self.walk(value, child_id.clone(), depth + 1);
            shape.push(format!("{key}:{}", node.kind()));
            field_meta.insert(key.clone(), field_descriptor(&node));
            self.relationships
                .push(RelationshipEdge::field(&id, child_id, key.clone()));
            fields.push(ObjectField {
                key: key.clone(),
                node,
            });
        }

        let class_name = object.class_name();
        let mut meta = JsonMap::new();
        meta.insert("fieldCount".into(), json!(fields.len()));
        meta.insert("fields".into(), JsonValue::Object(field_meta));
        if let Some(class_name) = &class_name {
            meta.insert("className".into(), json!(class_name));
        }
        if let Some(hint) = identity_hint(&entries) {
            meta.insert("identityHint".into(), hint);
        }
        let signature = format!(
            "{}{{{}}}",
            class_name.unwrap_or_default(),
            shape.join(",")
        );
        self.virtual_objects.push(VirtualObjectRecord::new(
            id.clone(),
            Category::Struct,
            signature,
            meta,
        ));
        self.ancestors.remove(&object.identity());

        ValueNode::Object {
            id,
            value_type,
            fields,
        }
    }

    fn function(&mut self, function: &FunctionRef, id: String) -> ValueNode {
        let (note, source, source_length) = if !self.options.inspect_function_bodies {
            (Some(FUNCTION_BODY_DISABLED.to_string()), None, None)
        } else {
            match function.source() {
                Some(source) => {
                    let (excerpt, truncated) =
                        truncate_chars(source, self.options.max_string_example);
                    if truncated {
                        self.truncation.truncated_strings += 1;
                    }
                    (None, Some(excerpt), Some(source.chars().count()))
                }
                None => (Some(FUNCTION_SOURCE_UNAVAILABLE.to_string()), None, None),
            }
        };
        ValueNode::Function {
            id,
            name: function.name().to_string(),
            arity: function.arity(),
            note,
            source,
            source_length,
        }
    }
}

fn unknown(opaque: &OpaqueRef, id: String) -> ValueNode {
    ValueNode::Unknown {
        id,
        value_type: opaque.type_tag().to_string(),
        description: opaque.description().map(str::to_string),
    }
}

/// `parent.key` for identifier-like keys, `parent["key"]` otherwise.
pub fn field_id(parent: &str, key: &str) -> String {
    if is_identifier(key) {
        format!("{parent}.{key}")
    } else {
        format!("{parent}[{}]", JsonValue::from(key))
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn number_example(number: f64) -> JsonValue {
    const SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if number.fract() == 0.0 && number.abs() <= SAFE_INTEGER {
        return json!(number as i64);
    }
    serde_json::Number::from_f64(number)
        .map(JsonValue::Number)
        .unwrap_or_else(|| json!(number.to_string()))
}

fn field_descriptor(node: &ValueNode) -> JsonValue {
    let mut descriptor = JsonMap::new();
    descriptor.insert("kind".into(), json!(node.kind()));
    descriptor.insert("valueType".into(), json!(node.value_type()));
    match node {
        ValueNode::Primitive { example, .. } => {
            descriptor.insert("example".into(), example.clone());
        }
        ValueNode::Function { note: Some(note), .. } => {
            descriptor.insert("note".into(), json!(note));
        }
        ValueNode::Cycle { shared: true, .. } => {
            descriptor.insert("note".into(), json!("shared reference"));
        }
        ValueNode::Cycle { .. } => {
            descriptor.insert("note".into(), json!("already visited"));
        }
        ValueNode::DepthLimit { depth, .. } => {
            descriptor.insert("note".into(), json!(format!("depth limit reached at {depth}")));
        }
        _ => {}
    }
    JsonValue::Object(descriptor)
}

fn identity_hint(entries: &[(String, Value)]) -> Option<JsonValue> {
    let mut hint = JsonMap::new();
    for key in IDENTITY_HINT_KEYS {
        if let Some((_, value)) = entries.iter().find(|(k, _)| k == key) {
            let rendered = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number_example(*number).to_string(),
                Value::BigInt(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                other => other.type_tag(),
            };
            hint.insert(key.to_string(), json!(rendered));
        }
    }
    (!hint.is_empty()).then_some(JsonValue::Object(hint))
}
