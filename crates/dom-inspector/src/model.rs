use std::collections::BTreeMap;

use excavator_core_types::{RelationshipEdge, VirtualObjectRecord};
use serde::{Deserialize, Serialize};

use crate::selectors::{SelectorKind, SelectorPattern};

/// One tag or class group observed under an inspected root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub selector: String,
    pub count: usize,
    pub attributes_example: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomSheet {
    pub id: String,
    pub tag_summaries: Vec<GroupSummary>,
    pub class_summaries: Vec<GroupSummary>,
    pub total_nodes: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomInspection {
    pub virtual_objects: Vec<VirtualObjectRecord>,
    pub relationships: Vec<RelationshipEdge>,
    pub dom_sheets: Vec<DomSheet>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SheetOrigin {
    Inline,
    /// External sheet whose text a [`crate::SheetSource`] supplied.
    Linked,
    CrossOriginOrRestricted,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSheetReport {
    pub id: String,
    pub origin: SheetOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub rule_count: usize,
    pub skipped_rules: usize,
    pub truncated_rules: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorStat {
    pub selector: String,
    pub kind: SelectorKind,
    pub pattern: SelectorPattern,
    /// Rules declaring this selector, across all sheets.
    pub rule_count: usize,
    pub live_matches: usize,
    pub sampled_matches: Vec<String>,
    pub hot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSummary {
    pub stylesheets: Vec<StyleSheetReport>,
    pub selectors: Vec<SelectorStat>,
    pub hot_selectors: Vec<String>,
    pub max_observed_matches: usize,
}

/// DOM grouping plus the style layer, records already merged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDomReport {
    pub virtual_objects: Vec<VirtualObjectRecord>,
    pub relationships: Vec<RelationshipEdge>,
    pub dom_sheets: Vec<DomSheet>,
    pub styles: StyleSummary,
}
