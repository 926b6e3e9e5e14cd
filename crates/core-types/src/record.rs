use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Collection,
    Struct,
    DomTag,
    DomClass,
    CssStylesheet,
    CssStyleRule,
    CssMediaRule,
    CssLayerRule,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Collection => "collection",
            Category::Struct => "struct",
            Category::DomTag => "dom-tag",
            Category::DomClass => "dom-class",
            Category::CssStylesheet => "css-stylesheet",
            Category::CssStyleRule => "css-style-rule",
            Category::CssMediaRule => "css-media-rule",
            Category::CssLayerRule => "css-layer-rule",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered structural unit. Built once, never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VirtualObjectRecord {
    pub id: String,
    pub category: Category,
    pub signature: String,
    #[serde(default)]
    pub meta: JsonMap<String, JsonValue>,
}

impl VirtualObjectRecord {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        signature: impl Into<String>,
        meta: JsonMap<String, JsonValue>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            signature: signature.into(),
            meta,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relation {
    Field,
    Summarizes,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub from: String,
    pub to: String,
    pub relation: Relation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl RelationshipEdge {
    pub fn field(from: impl Into<String>, to: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation: Relation::Field,
            field: Some(field.into()),
        }
    }

    pub fn summarizes(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation: Relation::Summarizes,
            field: None,
        }
    }
}

/// Identifier of a single CLI or harness run; unrelated to content ids.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
