use std::collections::BTreeMap;

use content_id::hash_bytes;
use dom_inspector::{DomSheet, StyleSummary};
use excavator_core_types::{RelationshipEdge, VirtualObjectRecord};
use serde::Serialize;

use crate::model::{ExcavationSummary, TruncationCounts};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintView<'a> {
    virtual_objects: &'a [VirtualObjectRecord],
    relationships: &'a [RelationshipEdge],
    dom_sheets: &'a [DomSheet],
}

pub(crate) struct SummaryInput<'a> {
    pub virtual_objects: &'a [VirtualObjectRecord],
    pub relationships: &'a [RelationshipEdge],
    pub dom_sheets: &'a [DomSheet],
    pub style_report: Option<&'a StyleSummary>,
    pub truncation: TruncationCounts,
    pub node_kinds: BTreeMap<String, usize>,
    pub max_depth_reached: usize,
}

pub(crate) fn build_summary(input: SummaryInput<'_>) -> ExcavationSummary {
    let mut categories = BTreeMap::new();
    for record in input.virtual_objects {
        *categories.entry(record.category).or_default() += 1;
    }
    ExcavationSummary {
        virtual_object_count: input.virtual_objects.len(),
        relationship_count: input.relationships.len(),
        categories,
        node_kinds: input.node_kinds,
        max_depth_reached: input.max_depth_reached,
        truncation: input.truncation,
        dom_nodes: input.dom_sheets.iter().map(|sheet| sheet.total_nodes).sum(),
        hot_selectors: input
            .style_report
            .map(|styles| styles.hot_selectors.len())
            .unwrap_or(0),
    }
}

/// Stable digest of the structural output; identical input gives an identical value.
pub fn fingerprint(
    virtual_objects: &[VirtualObjectRecord],
    relationships: &[RelationshipEdge],
    dom_sheets: &[DomSheet],
) -> String {
    let view = FingerprintView {
        virtual_objects,
        relationships,
        dom_sheets,
    };
    let canonical = serde_json::to_vec(&view).unwrap_or_default();
    hash_bytes("sha256", &canonical)
}
