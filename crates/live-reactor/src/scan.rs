use dom_inspector::css::parse_declarations;
use dom_inspector::{segment, truncate_bytes, truncate_chars};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

use crate::document::CapturedTarget;
use crate::model::LiveOptions;

/// Why an element counts as hidden content.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HiddenReason {
    HiddenAttribute,
    DisplayNone,
    VisibilityHidden,
    AriaHidden,
    OffFlow,
}

/// Path, bounded markup and label of one element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementSnapshot {
    pub path: String,
    pub content: String,
    pub content_truncated: bool,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanHit {
    pub snapshot: ElementSnapshot,
    pub reason: HiddenReason,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub hits: Vec<ScanHit>,
    pub examined: usize,
}

pub fn describe(element: ElementRef<'_>, options: &LiveOptions) -> ElementSnapshot {
    bound_snapshot(&capture_target(element), options)
}

/// Full path, markup and label of `element`, before any limit applies.
pub fn capture_target(element: ElementRef<'_>) -> CapturedTarget {
    let mut segments: Vec<String> = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(segment)
        .collect();
    segments.reverse();
    segments.push(segment(element));
    CapturedTarget {
        segments,
        markup: element.html(),
        label: full_label(element),
    }
}

/// Applies the path, byte and char limits of `options` to a capture.
pub fn bound_snapshot(target: &CapturedTarget, options: &LiveOptions) -> ElementSnapshot {
    let keep = options.path_segments.max(1);
    let skip = target.segments.len().saturating_sub(keep);
    let (content, content_truncated) = truncate_bytes(&target.markup, options.max_content_bytes);
    ElementSnapshot {
        path: target.segments[skip..].join(" > "),
        content: content.to_string(),
        content_truncated,
        label: truncate_chars(&target.label, options.label_chars).0,
    }
}

/// Examines at most `4 × batch_limit` elements under `<body>` and keeps at most
/// `batch_limit` hidden ones that carry text.
pub fn scan_hidden(html: &Html, options: &LiveOptions) -> ScanOutcome {
    let root = html
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "body")
        .unwrap_or_else(|| html.root_element());

    let budget = options.scan_budget();
    let mut outcome = ScanOutcome::default();
    for element in root.descendants().filter_map(ElementRef::wrap) {
        if outcome.examined >= budget || outcome.hits.len() >= options.batch_limit {
            break;
        }
        outcome.examined += 1;
        let Some(reason) = hidden_reason(element) else {
            continue;
        };
        if !has_text(element) {
            continue;
        }
        outcome.hits.push(ScanHit {
            snapshot: describe(element, options),
            reason,
        });
    }
    outcome
}

pub fn hidden_reason(element: ElementRef<'_>) -> Option<HiddenReason> {
    let value = element.value();
    if value.attr("hidden").is_some() {
        return Some(HiddenReason::HiddenAttribute);
    }
    let declarations = value
        .attr("style")
        .map(parse_declarations)
        .unwrap_or_default();
    let property = |name: &str| {
        declarations
            .iter()
            .rev()
            .find(|(prop, _)| prop == name)
            .map(|(_, v)| v.to_ascii_lowercase())
    };

    if property("display").as_deref() == Some("none") {
        return Some(HiddenReason::DisplayNone);
    }
    if property("visibility").as_deref() == Some("hidden") {
        return Some(HiddenReason::VisibilityHidden);
    }
    if value
        .attr("aria-hidden")
        .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"))
    {
        return Some(HiddenReason::AriaHidden);
    }
    if matches!(property("position").as_deref(), Some("absolute" | "fixed")) {
        let negative_offset = ["left", "top", "right", "bottom"]
            .iter()
            .any(|side| property(side).is_some_and(|v| v.trim_start().starts_with('-')));
        let clipped = ["clip", "clip-path"]
            .iter()
            .any(|prop| property(prop).is_some_and(|v| v != "auto" && v != "none"));
        if negative_offset || clipped {
            return Some(HiddenReason::OffFlow);
        }
    }
    None
}

fn has_text(element: ElementRef<'_>) -> bool {
    element.text().any(|chunk| !chunk.trim().is_empty())
}

fn full_label(element: ElementRef<'_>) -> String {
    let value = element.value();
    let explicit = ["aria-label", "title", "alt"]
        .iter()
        .filter_map(|name| value.attr(name))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string);
    let text = explicit.unwrap_or_else(|| {
        element
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    });
    if text.is_empty() {
        return value.name().to_string();
    }
    text
}
