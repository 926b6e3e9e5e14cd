use std::collections::HashMap;
use std::time::Instant;

use excavator_core_types::{Category, RelationshipEdge, VirtualObjectRecord};
use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Map as JsonMap};

use crate::css::{
    parse_declarations, parse_stylesheet_with_depth, split_selector_list, CssRule,
};
use crate::events;
use crate::inspector::DomInspector;
use crate::model::{
    SelectorStat, SheetOrigin, StyleDomReport, StyleSheetReport, StyleSummary,
};
use crate::path::structural_path;
use crate::policy::InspectOptions;
use crate::selectors::{classify_kind, classify_pattern};

const RESTRICTED_ERROR: &str = "stylesheet rules are not accessible";

/// Supplies the text of `<link rel="stylesheet">` sheets.
pub trait SheetSource {
    /// `None` marks the sheet as cross-origin or otherwise restricted.
    fn fetch(&self, href: &str) -> Option<String>;
}

/// Treats every external sheet as restricted.
#[derive(Clone, Copy, Debug, Default)]
pub struct RestrictedSheets;

impl SheetSource for RestrictedSheets {
    fn fetch(&self, _href: &str) -> Option<String> {
        None
    }
}

pub fn inspect_style_and_dom(document: &Html, options: &InspectOptions) -> StyleDomReport {
    inspect_style_and_dom_with(document, options, &RestrictedSheets)
}

pub fn inspect_style_and_dom_with(
    document: &Html,
    options: &InspectOptions,
    source: &dyn SheetSource,
) -> StyleDomReport {
    let started = Instant::now();
    let dom = DomInspector::new(options.clone()).inspect_document(document);

    let mut scan = RuleScan::new(options.max_rules_per_sheet);
    let mut stylesheets = Vec::new();

    for (index, element) in sheet_elements(document).into_iter().enumerate() {
        let sheet_id = format!("css:sheet:{index}");
        let (origin, href, text) = match element.value().name() {
            "style" => (SheetOrigin::Inline, None, Some(element.text().collect::<String>())),
            _ => {
                let href = element.value().attr("href").map(str::to_string);
                let text = href.as_deref().and_then(|h| source.fetch(h));
                let origin = if text.is_some() {
                    SheetOrigin::Linked
                } else {
                    SheetOrigin::CrossOriginOrRestricted
                };
                (origin, href, text)
            }
        };

        scan.begin_sheet();
        let mut rule_objects = Vec::new();
        let mut rule_edges = Vec::new();
        let error = match text {
            Some(text) => {
                let rules = parse_stylesheet_with_depth(&text, options.max_rule_depth);
                scan.walk(&rules, &sheet_id, &mut rule_objects, &mut rule_edges);
                None
            }
            None => {
                events::emit_sheet_restricted(&sheet_id, href.as_deref());
                Some(RESTRICTED_ERROR.to_string())
            }
        };

        let report = StyleSheetReport {
            id: sheet_id.clone(),
            origin,
            href,
            rule_count: scan.recorded,
            skipped_rules: scan.skipped,
            truncated_rules: scan.truncated,
            error,
        };
        scan.objects.push(sheet_record(&report));
        scan.objects.append(&mut rule_objects);
        scan.edges.append(&mut rule_edges);
        stylesheets.push(report);
    }

    let selectors = scan.selector_stats(document, options);
    let max_observed_matches = selectors.iter().map(|s| s.live_matches).max().unwrap_or(0);
    let threshold = options.hot_threshold(max_observed_matches);
    let selectors: Vec<SelectorStat> = selectors
        .into_iter()
        .map(|mut stat| {
            stat.hot = stat.live_matches > 0 && stat.live_matches >= threshold;
            stat
        })
        .collect();
    let hot_selectors: Vec<String> = selectors
        .iter()
        .filter(|s| s.hot)
        .map(|s| s.selector.clone())
        .collect();

    events::emit_styles_inspected(
        stylesheets.len(),
        selectors.len(),
        hot_selectors.len(),
        started.elapsed(),
    );

    let mut virtual_objects = dom.virtual_objects;
    virtual_objects.extend(scan.objects);
    let mut relationships = dom.relationships;
    relationships.extend(scan.edges);

    StyleDomReport {
        virtual_objects,
        relationships,
        dom_sheets: dom.dom_sheets,
        styles: StyleSummary {
            stylesheets,
            selectors,
            hot_selectors,
            max_observed_matches,
        },
    }
}

fn sheet_elements(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| match el.value().name() {
            "style" => true,
            "link" => el.value().attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("stylesheet"))
            }),
            _ => false,
        })
        .collect()
}

fn sheet_record(report: &StyleSheetReport) -> VirtualObjectRecord {
    let mut meta = JsonMap::new();
    meta.insert("origin".into(), json!(report.origin));
    if let Some(href) = &report.href {
        meta.insert("href".into(), json!(href));
    }
    meta.insert("ruleCount".into(), json!(report.rule_count));
    meta.insert("skippedRules".into(), json!(report.skipped_rules));
    meta.insert("truncatedRules".into(), json!(report.truncated_rules));
    if let Some(error) = &report.error {
        meta.insert("error".into(), json!(error));
    }
    let signature = report.href.clone().unwrap_or_else(|| "inline".to_string());
    VirtualObjectRecord::new(report.id.clone(), Category::CssStylesheet, signature, meta)
}

struct SelectorEntry {
    selector: String,
    rule_count: usize,
}

struct RuleScan {
    max_rules: usize,
    recorded: usize,
    skipped: usize,
    truncated: usize,
    objects: Vec<VirtualObjectRecord>,
    edges: Vec<RelationshipEdge>,
    selectors: Vec<SelectorEntry>,
    selector_index: HashMap<String, usize>,
}

impl RuleScan {
    fn new(max_rules: usize) -> Self {
        Self {
            max_rules,
            recorded: 0,
            skipped: 0,
            truncated: 0,
            objects: Vec::new(),
            edges: Vec::new(),
            selectors: Vec::new(),
            selector_index: HashMap::new(),
        }
    }

    fn begin_sheet(&mut self) {
        self.recorded = 0;
        self.skipped = 0;
        self.truncated = 0;
    }

    fn walk(
        &mut self,
        rules: &[CssRule],
        parent_id: &str,
        objects: &mut Vec<VirtualObjectRecord>,
        edges: &mut Vec<RelationshipEdge>,
    ) {
        for (position, rule) in rules.iter().enumerate() {
            if matches!(rule, CssRule::Other { .. }) {
                self.skipped += 1;
                continue;
            }
            if self.recorded >= self.max_rules {
                self.truncated += 1;
                continue;
            }
            self.recorded += 1;

            let rule_id = format!("{parent_id}/rule:{position}");
            let mut meta = JsonMap::new();
            let (category, signature) = match rule {
                CssRule::Style {
                    selector_text,
                    declarations,
                } => {
                    let selectors = split_selector_list(selector_text);
                    for selector in &selectors {
                        self.note_selector(selector);
                    }
                    meta.insert("selectors".into(), json!(selectors));
                    meta.insert(
                        "declarationCount".into(),
                        json!(parse_declarations(declarations).len()),
                    );
                    (Category::CssStyleRule, selector_text.clone())
                }
                CssRule::Media { condition, rules } => {
                    meta.insert("condition".into(), json!(condition));
                    meta.insert("ruleCount".into(), json!(rules.len()));
                    (Category::CssMediaRule, format!("@media {condition}"))
                }
                CssRule::Layer {
                    names,
                    rules,
                    statement,
                } => {
                    meta.insert("names".into(), json!(names));
                    meta.insert("statement".into(), json!(statement));
                    meta.insert("ruleCount".into(), json!(rules.len()));
                    (Category::CssLayerRule, format!("@layer {}", names.join(", ")))
                }
                CssRule::Other { .. } => continue,
            };
            edges.push(RelationshipEdge::field(
                parent_id,
                &rule_id,
                format!("cssRules[{position}]"),
            ));
            objects.push(VirtualObjectRecord::new(
                rule_id.clone(),
                category,
                signature.trim(),
                meta,
            ));
            let nested = rule.nested();
            if !nested.is_empty() {
                self.walk(nested, &rule_id, objects, edges);
            }
        }
    }

    fn note_selector(&mut self, selector: &str) {
        match self.selector_index.get(selector) {
            Some(&idx) => self.selectors[idx].rule_count += 1,
            None => {
                self.selector_index
                    .insert(selector.to_string(), self.selectors.len());
                self.selectors.push(SelectorEntry {
                    selector: selector.to_string(),
                    rule_count: 1,
                });
            }
        }
    }

    fn selector_stats(&self, document: &Html, options: &InspectOptions) -> Vec<SelectorStat> {
        self.selectors
            .iter()
            .map(|entry| {
                let mut stat = SelectorStat {
                    selector: entry.selector.clone(),
                    kind: classify_kind(&entry.selector),
                    pattern: classify_pattern(&entry.selector),
                    rule_count: entry.rule_count,
                    live_matches: 0,
                    sampled_matches: Vec::new(),
                    hot: false,
                    error: None,
                };
                match Selector::parse(&entry.selector) {
                    Ok(compiled) => {
                        for element in document.select(&compiled) {
                            stat.live_matches += 1;
                            if stat.sampled_matches.len() < options.max_sampled_matches {
                                stat.sampled_matches
                                    .push(structural_path(element, options.path_segments));
                            }
                        }
                    }
                    Err(err) => {
                        let message = err.to_string();
                        events::emit_selector_unsupported(&entry.selector, &message);
                        stat.error = Some(message);
                    }
                }
                stat
            })
            .collect()
    }
}
