use std::time::Duration;

use tracing::{debug, trace};

pub fn emit_cycle(id: &str, shared: bool) {
    trace!(target: "excavator.walk", id, shared, "walk.cycle.sentinel");
}

pub fn emit_depth_limit(id: &str, depth: usize) {
    trace!(target: "excavator.walk", id, depth, "walk.depth.limited");
}

pub fn emit_dom_merged(records: usize, sheets: usize, styles: bool) {
    debug!(
        target: "excavator.walk",
        records,
        sheets,
        styles,
        "walk.dom.merged"
    );
}

pub fn emit_excavation(
    virtual_objects: usize,
    relationships: usize,
    depth_limited: usize,
    cycles: usize,
    duration: Duration,
) {
    debug!(
        target: "excavator.walk",
        virtual_objects,
        relationships,
        depth_limited,
        cycles,
        elapsed_us = duration.as_micros() as u64,
        "walk.completed"
    );
}
