use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use excavator_core_types::{Category, RelationshipEdge, VirtualObjectRecord};
use scraper::{ElementRef, Html};
use serde_json::{json, Map as JsonMap};

use crate::events;
use crate::model::{DomInspection, DomSheet, GroupSummary};
use crate::path::truncate_chars;
use crate::policy::InspectOptions;

pub const DOM_SHEET_ID: &str = "dom-sheet:0";

#[derive(Default)]
struct Group {
    count: usize,
    example: Option<BTreeMap<String, String>>,
}

impl Group {
    fn observe(&mut self, element: ElementRef<'_>, value_limit: usize) {
        self.count += 1;
        if self.example.is_none() {
            let example = attributes_example(element, value_limit);
            if !example.is_empty() {
                self.example = Some(example);
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DomInspector {
    options: InspectOptions,
}

impl DomInspector {
    pub fn new(options: InspectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &InspectOptions {
        &self.options
    }

    pub fn inspect_document(&self, document: &Html) -> DomInspection {
        self.inspect_tree(document.root_element())
    }

    /// Groups every element under `root` (inclusive) by tag and by class token.
    pub fn inspect_tree(&self, root: ElementRef<'_>) -> DomInspection {
        let started = Instant::now();
        let limit = self.options.attribute_value_limit;
        let mut tags: HashMap<String, Group> = HashMap::new();
        let mut classes: HashMap<String, Group> = HashMap::new();
        let mut total_nodes = 0usize;

        for element in root.descendants().filter_map(ElementRef::wrap) {
            total_nodes += 1;
            let tag = element.value().name().to_ascii_lowercase();
            tags.entry(tag).or_default().observe(element, limit);
            for class in element.value().classes() {
                classes
                    .entry(class.to_string())
                    .or_default()
                    .observe(element, limit);
            }
        }

        let tag_summaries = summarize(tags, |tag| tag.to_string());
        let class_summaries = summarize(classes, |class| format!(".{class}"));

        let mut virtual_objects = Vec::with_capacity(tag_summaries.len() + class_summaries.len());
        let mut relationships = Vec::with_capacity(virtual_objects.capacity());
        for summary in &tag_summaries {
            let record = group_record(Category::DomTag, "dom:tag:", &summary.selector, summary);
            relationships.push(RelationshipEdge::summarizes(DOM_SHEET_ID, &record.id));
            virtual_objects.push(record);
        }
        for summary in &class_summaries {
            let token = summary.selector.trim_start_matches('.');
            let record = group_record(Category::DomClass, "dom:class:", token, summary);
            relationships.push(RelationshipEdge::summarizes(DOM_SHEET_ID, &record.id));
            virtual_objects.push(record);
        }

        events::emit_tree_inspected(
            total_nodes,
            tag_summaries.len(),
            class_summaries.len(),
            started.elapsed(),
        );

        DomInspection {
            virtual_objects,
            relationships,
            dom_sheets: vec![DomSheet {
                id: DOM_SHEET_ID.to_string(),
                tag_summaries,
                class_summaries,
                total_nodes,
            }],
        }
    }
}

pub fn inspect_tree(root: ElementRef<'_>) -> DomInspection {
    DomInspector::default().inspect_tree(root)
}

fn summarize(
    groups: HashMap<String, Group>,
    selector: impl Fn(&str) -> String,
) -> Vec<GroupSummary> {
    let mut summaries: Vec<GroupSummary> = groups
        .into_iter()
        .map(|(key, group)| GroupSummary {
            selector: selector(&key),
            count: group.count,
            attributes_example: group.example.unwrap_or_default(),
        })
        .collect();
    summaries.sort_by(|a, b| {
        (Reverse(a.count), &a.selector).cmp(&(Reverse(b.count), &b.selector))
    });
    summaries
}

fn group_record(
    category: Category,
    id_prefix: &str,
    key: &str,
    summary: &GroupSummary,
) -> VirtualObjectRecord {
    let mut meta = JsonMap::new();
    meta.insert("selector".into(), json!(summary.selector));
    meta.insert("count".into(), json!(summary.count));
    meta.insert("attributesExample".into(), json!(summary.attributes_example));
    meta.insert("sheet".into(), json!(DOM_SHEET_ID));
    VirtualObjectRecord::new(
        format!("{id_prefix}{key}"),
        category,
        summary.selector.clone(),
        meta,
    )
}

fn attributes_example(element: ElementRef<'_>, value_limit: usize) -> BTreeMap<String, String> {
    element
        .value()
        .attrs()
        .filter(|(name, _)| !excluded_attribute(name))
        .map(|(name, value)| (name.to_string(), truncate_chars(value, value_limit).0))
        .collect()
}

fn excluded_attribute(name: &str) -> bool {
    name == "class" || name == "style" || name.starts_with("data-")
}

#[cfg(test)]
mod tests {
    use excavator_core_types::Relation;
    use pretty_assertions::assert_eq;

    use super::*;

    fn body_fragment(markup: &str) -> Html {
        Html::parse_document(&format!("<html><body>{markup}</body></html>"))
    }

    #[test]
    fn groups_by_tag_and_class() {
        let html = body_fragment(
            r#"<div class="btn" id="a" data-x="1" style="color:red">A</div>
               <div class="btn">B</div>
               <span class="btn">C</span>"#,
        );
        let inspection = DomInspector::default().inspect_document(&html);
        let sheet = &inspection.dom_sheets[0];

        let count_of = |summaries: &[GroupSummary], selector: &str| {
            summaries
                .iter()
                .find(|s| s.selector == selector)
                .map(|s| s.count)
        };
        assert_eq!(count_of(&sheet.tag_summaries, "div"), Some(2));
        assert_eq!(count_of(&sheet.tag_summaries, "span"), Some(1));
        assert_eq!(count_of(&sheet.class_summaries, ".btn"), Some(3));
        // html, head, body, 2 div, 1 span
        assert_eq!(sheet.total_nodes, 6);

        let div = sheet
            .tag_summaries
            .iter()
            .find(|s| s.selector == "div")
            .unwrap();
        assert_eq!(
            div.attributes_example,
            BTreeMap::from([("id".to_string(), "a".to_string())])
        );
    }

    #[test]
    fn records_and_edges_hang_off_the_sheet() {
        let html = body_fragment(r#"<p class="note">x</p>"#);
        let inspection = DomInspector::default().inspect_document(&html);

        let ids: Vec<&str> = inspection
            .virtual_objects
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert!(ids.contains(&"dom:tag:p"));
        assert!(ids.contains(&"dom:class:note"));
        let class_record = inspection
            .virtual_objects
            .iter()
            .find(|r| r.id == "dom:class:note")
            .unwrap();
        assert_eq!(class_record.category, Category::DomClass);
        assert_eq!(class_record.signature, ".note");

        assert_eq!(inspection.relationships.len(), inspection.virtual_objects.len());
        assert!(inspection
            .relationships
            .iter()
            .all(|e| e.from == DOM_SHEET_ID && e.relation == Relation::Summarizes));
    }

    #[test]
    fn attribute_values_are_truncated() {
        let long = "x".repeat(300);
        let html = body_fragment(&format!(r#"<a title="{long}">link</a>"#));
        let options = InspectOptions {
            attribute_value_limit: 10,
            ..InspectOptions::default()
        };
        let inspection = DomInspector::new(options).inspect_document(&html);
        let anchor = inspection.dom_sheets[0]
            .tag_summaries
            .iter()
            .find(|s| s.selector == "a")
            .unwrap();
        assert_eq!(anchor.attributes_example["title"].len(), 10);
    }

    #[test]
    fn summaries_are_ordered_by_count_then_selector() {
        let html = body_fragment("<i></i><b></b><b></b>");
        let inspection = inspect_tree(html.root_element());
        let order: Vec<&str> = inspection.dom_sheets[0]
            .tag_summaries
            .iter()
            .map(|s| s.selector.as_str())
            .collect();
        assert_eq!(order, vec!["b", "body", "head", "html", "i"]);
    }
}
