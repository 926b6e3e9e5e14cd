use tracing::{debug, warn};

use crate::errors::ReactorError;

pub fn emit_attached(url: &str, batches: bool) {
    debug!(target: "excavator.live", url, batches, "live.reactor.attached");
}

pub fn emit_detached(url: &str) {
    debug!(target: "excavator.live", url, "live.reactor.detached");
}

pub fn emit_snapshot(event: &str, selector: &str, reduced_strength: bool) {
    debug!(
        target: "excavator.live",
        event,
        selector,
        reduced_strength,
        "live.snapshot.emitted"
    );
}

pub fn emit_superseded_target(event: &str, captured_at: u64, current: u64) {
    debug!(
        target: "excavator.live",
        event,
        captured_at,
        current,
        "live.target.superseded"
    );
}

pub fn emit_batch(examined: usize, emitted: usize) {
    debug!(
        target: "excavator.live",
        examined,
        emitted,
        "live.batch.emitted"
    );
}

pub fn emit_handler_failure(stage: &str, err: &ReactorError) {
    warn!(target: "excavator.live", stage, %err, "live.handler.failed");
}

pub fn emit_callback_panic(stage: &str) {
    warn!(target: "excavator.live", stage, "live.callback.panicked");
}

pub fn emit_lagged(channel: &str, skipped: u64) {
    warn!(target: "excavator.live", channel, skipped, "live.channel.lagged");
}
