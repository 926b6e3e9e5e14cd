use std::collections::BTreeMap;

use dom_inspector::{DomSheet, StyleSummary};
use excavator_core_types::{Category, RelationshipEdge, VirtualObjectRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const FUNCTION_BODY_DISABLED: &str = "function body inspection disabled";
pub const FUNCTION_SOURCE_UNAVAILABLE: &str = "function source unavailable";

/// Per-value descriptor produced by one walk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValueNode {
    #[serde(rename_all = "camelCase")]
    Null { id: String, value_type: String },
    #[serde(rename_all = "camelCase")]
    Undefined { id: String, value_type: String },
    #[serde(rename_all = "camelCase")]
    Primitive {
        id: String,
        value_type: String,
        example: JsonValue,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        truncated: bool,
    },
    #[serde(rename_all = "camelCase")]
    Array {
        id: String,
        length: usize,
        sampled: usize,
        element_kinds: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        holes: Vec<usize>,
        children: Vec<ValueNode>,
    },
    #[serde(rename_all = "camelCase")]
    Object {
        id: String,
        value_type: String,
        fields: Vec<ObjectField>,
    },
    #[serde(rename_all = "camelCase")]
    Function {
        id: String,
        name: String,
        arity: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_length: Option<usize>,
    },
    /// Repeated identity. `shared` is set when the value was already walked on
    /// another path and is not an ancestor of this one.
    #[serde(rename_all = "camelCase")]
    Cycle {
        id: String,
        value_type: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        shared: bool,
    },
    #[serde(rename_all = "camelCase")]
    DepthLimit {
        id: String,
        depth: usize,
        value_type: String,
    },
    #[serde(rename_all = "camelCase")]
    Unknown {
        id: String,
        value_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectField {
    pub key: String,
    pub node: ValueNode,
}

impl ValueNode {
    pub fn id(&self) -> &str {
        match self {
            ValueNode::Null { id, .. }
            | ValueNode::Undefined { id, .. }
            | ValueNode::Primitive { id, .. }
            | ValueNode::Array { id, .. }
            | ValueNode::Object { id, .. }
            | ValueNode::Function { id, .. }
            | ValueNode::Cycle { id, .. }
            | ValueNode::DepthLimit { id, .. }
            | ValueNode::Unknown { id, .. } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ValueNode::Null { .. } => "null",
            ValueNode::Undefined { .. } => "undefined",
            ValueNode::Primitive { .. } => "primitive",
            ValueNode::Array { .. } => "array",
            ValueNode::Object { .. } => "object",
            ValueNode::Function { .. } => "function",
            ValueNode::Cycle { .. } => "cycle",
            ValueNode::DepthLimit { .. } => "depth-limit",
            ValueNode::Unknown { .. } => "unknown",
        }
    }

    pub fn value_type(&self) -> &str {
        match self {
            ValueNode::Array { .. } => "array",
            ValueNode::Function { .. } => "function",
            ValueNode::Null { value_type, .. }
            | ValueNode::Undefined { value_type, .. }
            | ValueNode::Primitive { value_type, .. }
            | ValueNode::Object { value_type, .. }
            | ValueNode::Cycle { value_type, .. }
            | ValueNode::DepthLimit { value_type, .. }
            | ValueNode::Unknown { value_type, .. } => value_type,
        }
    }

    /// Direct children in walk order.
    pub fn children(&self) -> Vec<&ValueNode> {
        match self {
            ValueNode::Array { children, .. } => children.iter().collect(),
            ValueNode::Object { fields, .. } => fields.iter().map(|f| &f.node).collect(),
            _ => Vec::new(),
        }
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&ValueNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children().into_iter().find_map(|child| child.find(id))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncationCounts {
    pub depth_limited: usize,
    /// Back references to an ancestor.
    pub cycles: usize,
    #[serde(default)]
    pub shared_references: usize,
    pub sampled_arrays: usize,
    pub truncated_strings: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcavationSummary {
    pub virtual_object_count: usize,
    pub relationship_count: usize,
    pub categories: BTreeMap<Category, usize>,
    pub node_kinds: BTreeMap<String, usize>,
    pub max_depth_reached: usize,
    pub truncation: TruncationCounts,
    pub dom_nodes: usize,
    pub hot_selectors: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcavationResult {
    pub root: ValueNode,
    pub virtual_objects: Vec<VirtualObjectRecord>,
    pub relationships: Vec<RelationshipEdge>,
    pub dom_sheets: Vec<DomSheet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_report: Option<StyleSummary>,
    pub summary: ExcavationSummary,
    /// `sha256_<hex>` over the records, edges and sheets.
    pub fingerprint: String,
}

impl ExcavationResult {
    pub fn records_of(&self, category: Category) -> impl Iterator<Item = &VirtualObjectRecord> {
        self.virtual_objects
            .iter()
            .filter(move |record| record.category == category)
    }

    pub fn record(&self, id: &str) -> Option<&VirtualObjectRecord> {
        self.virtual_objects.iter().find(|record| record.id == id)
    }
}
