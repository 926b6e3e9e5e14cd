//! Tag/class grouping over a parsed document and, in the extended variant,
//! a style-rule layer with selector classification and live match counts.

pub mod css;
pub mod events;
pub mod inspector;
pub mod model;
pub mod path;
pub mod policy;
pub mod selectors;
pub mod styles;

pub use inspector::{inspect_tree, DomInspector, DOM_SHEET_ID};
pub use model::{
    DomInspection, DomSheet, GroupSummary, SelectorStat, SheetOrigin, StyleDomReport,
    StyleSheetReport, StyleSummary,
};
pub use path::{segment, structural_path, truncate_bytes, truncate_chars, DEFAULT_PATH_SEGMENTS};
pub use policy::InspectOptions;
pub use selectors::{classify_kind, classify_pattern, SelectorKind, SelectorPattern};
pub use styles::{inspect_style_and_dom, inspect_style_and_dom_with, RestrictedSheets, SheetSource};

pub use scraper::{ElementRef, Html};
