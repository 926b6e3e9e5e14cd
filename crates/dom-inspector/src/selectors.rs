use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectorKind {
    IdOnly,
    ClassOnly,
    TagOnly,
    Combinator,
    PseudoSelector,
    AttributeSelector,
    Unknown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectorPattern {
    CssModulesHash,
    BemElementModifier,
    BemElement,
    BemModifier,
    UtilityClass,
    Generic,
}

static ID_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[\w-]+$").expect("valid regex"));
static CLASS_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\.[\w-]+)+$").expect("valid regex"));
static TAG_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][\w-]*$").expect("valid regex"));
static COMBINATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s>+~]").expect("valid regex"));
static FIRST_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(-?[A-Za-z_][\w-]*)").expect("valid regex"));
static CSS_MODULES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9]*_[A-Za-z0-9-]+__[A-Za-z0-9_-]{5}$").expect("valid regex")
});
static CSS_MODULES_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^_[A-Za-z0-9_-]{5,}$").expect("valid regex"));
static UTILITY_PREFIXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^-?(m|mx|my|mt|mb|ml|mr|p|px|py|pt|pb|pl|pr|w|h|min-w|min-h|max-w|max-h|text|bg|border|rounded|shadow|font|leading|tracking|gap|space-x|space-y|grid-cols|col-span|row-span|z|top|left|right|bottom|inset|opacity|items|justify|content|self|order|overflow|cursor|flex|basis|grow|shrink)-[A-Za-z0-9./%\[\]#-]+$",
    )
    .expect("valid regex")
});
static UTILITY_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(flex|grid|block|inline|inline-block|inline-flex|hidden|contents|absolute|relative|fixed|sticky|static|underline|italic|uppercase|lowercase|capitalize|truncate|container|sr-only)$",
    )
    .expect("valid regex")
});

/// First match wins, in declaration order of [`SelectorKind`].
pub fn classify_kind(selector: &str) -> SelectorKind {
    let selector = selector.trim();
    if ID_ONLY.is_match(selector) {
        return SelectorKind::IdOnly;
    }
    if CLASS_ONLY.is_match(selector) {
        return SelectorKind::ClassOnly;
    }
    if TAG_ONLY.is_match(selector) {
        return SelectorKind::TagOnly;
    }
    let outer = top_level(selector);
    if COMBINATOR.is_match(outer.trim()) {
        return SelectorKind::Combinator;
    }
    if selector.contains(':') {
        return SelectorKind::PseudoSelector;
    }
    if selector.contains('[') {
        return SelectorKind::AttributeSelector;
    }
    SelectorKind::Unknown
}

/// Naming convention of the first class token; `generic` when there is none.
pub fn classify_pattern(selector: &str) -> SelectorPattern {
    let outer = top_level(selector);
    let Some(class) = FIRST_CLASS.captures(&outer).and_then(|c| c.get(1)) else {
        return SelectorPattern::Generic;
    };
    pattern_for_class(class.as_str())
}

pub fn pattern_for_class(class: &str) -> SelectorPattern {
    if CSS_MODULES.is_match(class) || CSS_MODULES_SHORT.is_match(class) {
        SelectorPattern::CssModulesHash
    } else if class.contains("__") && class.contains("--") {
        SelectorPattern::BemElementModifier
    } else if class.contains("__") {
        SelectorPattern::BemElement
    } else if class.contains("--") {
        SelectorPattern::BemModifier
    } else if UTILITY_PREFIXED.is_match(class) || UTILITY_KEYWORD.is_match(class) {
        SelectorPattern::UtilityClass
    } else {
        SelectorPattern::Generic
    }
}

/// Selector text with the contents of `[...]`, `(...)` and quoted strings blanked out.
fn top_level(selector: &str) -> String {
    let mut out = String::with_capacity(selector.len());
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in selector.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '(' => {
                if depth == 0 {
                    out.push(c);
                }
                depth += 1;
            }
            ']' | ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    out.push(c);
                }
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
