use std::time::Duration;

use tracing::debug;

pub fn emit_tree_inspected(total_nodes: usize, tags: usize, classes: usize, duration: Duration) {
    debug!(
        target: "excavator.dom",
        total_nodes,
        tags,
        classes,
        elapsed_us = duration.as_micros() as u64,
        "dom.tree.inspected"
    );
}

pub fn emit_styles_inspected(
    sheets: usize,
    selectors: usize,
    hot: usize,
    duration: Duration,
) {
    debug!(
        target: "excavator.dom",
        sheets,
        selectors,
        hot,
        elapsed_us = duration.as_micros() as u64,
        "dom.styles.inspected"
    );
}

pub fn emit_sheet_restricted(sheet_id: &str, href: Option<&str>) {
    debug!(
        target: "excavator.dom",
        sheet_id,
        href = href.unwrap_or(""),
        "dom.styles.sheet_restricted"
    );
}

pub fn emit_selector_unsupported(selector: &str, error: &str) {
    debug!(
        target: "excavator.dom",
        selector,
        error,
        "dom.styles.selector_unsupported"
    );
}
