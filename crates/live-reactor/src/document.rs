//! Single-threaded host document with listener and observer channels.
//!
//! The parsed tree is not `Send`, so a [`LiveDocument`] lives behind an `Rc`
//! and is only touched from tasks on the same `LocalSet`. Events carry a
//! capture of their target taken at dispatch, so a listener still sees the
//! element after a later mutation replaced it. Any mutation bumps the revision.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::errors::{ReactorError, ReactorResult};
use crate::scan::capture_target;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    PointerEnter,
    Click,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PointerEnter => "pointerenter",
            EventType::Click => "click",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pointerenter" | "mouseenter" => Ok(EventType::PointerEnter),
            "click" => Ok(EventType::Click),
            other => Err(format!("unsupported event type `{other}`")),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Capture,
    Bubble,
}

/// Unbounded view of an event target, taken while it is still in the tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CapturedTarget {
    /// `tag#id.class` segments, outermost first.
    pub segments: Vec<String>,
    pub markup: String,
    pub label: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DomEvent {
    pub event_type: EventType,
    pub target: CapturedTarget,
    /// Revision the target was captured at.
    pub revision: u64,
}

/// One coalesced notification per mutating call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MutationBatch {
    pub revision: u64,
    pub removed_elements: usize,
    pub added_elements: usize,
}

pub struct DocumentBus {
    capture: broadcast::Sender<DomEvent>,
    bubble: broadcast::Sender<DomEvent>,
    mutations: broadcast::Sender<MutationBatch>,
    capture_listeners: Cell<usize>,
    bubble_listeners: Cell<usize>,
    observers: Cell<usize>,
}

impl DocumentBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (capture, _) = broadcast::channel(capacity);
        let (bubble, _) = broadcast::channel(capacity);
        let (mutations, _) = broadcast::channel(capacity);
        Self {
            capture,
            bubble,
            mutations,
            capture_listeners: Cell::new(0),
            bubble_listeners: Cell::new(0),
            observers: Cell::new(0),
        }
    }

    pub fn add_event_listener(&self, phase: Phase) -> broadcast::Receiver<DomEvent> {
        let (sender, counter) = self.phase(phase);
        counter.set(counter.get() + 1);
        sender.subscribe()
    }

    /// Pairs with [`DocumentBus::add_event_listener`]; the receiver itself is dropped by the caller.
    pub fn remove_event_listener(&self, phase: Phase) {
        let (_, counter) = self.phase(phase);
        counter.set(counter.get().saturating_sub(1));
    }

    pub fn observe_mutations(&self) -> broadcast::Receiver<MutationBatch> {
        self.observers.set(self.observers.get() + 1);
        self.mutations.subscribe()
    }

    pub fn disconnect_observer(&self) {
        self.observers.set(self.observers.get().saturating_sub(1));
    }

    pub fn listener_count(&self, phase: Phase) -> usize {
        self.phase(phase).1.get()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.get()
    }

    fn phase(&self, phase: Phase) -> (&broadcast::Sender<DomEvent>, &Cell<usize>) {
        match phase {
            Phase::Capture => (&self.capture, &self.capture_listeners),
            Phase::Bubble => (&self.bubble, &self.bubble_listeners),
        }
    }

    /// Capture receivers get the event before bubble receivers.
    fn dispatch(&self, event: DomEvent) -> usize {
        let captured = self.capture.send(event.clone()).unwrap_or(0);
        let bubbled = self.bubble.send(event).unwrap_or(0);
        captured + bubbled
    }

    fn publish(&self, batch: MutationBatch) -> usize {
        self.mutations.send(batch).unwrap_or(0)
    }
}

impl Default for DocumentBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

pub struct LiveDocument {
    url: String,
    html: RefCell<Html>,
    revision: Cell<u64>,
    bus: DocumentBus,
}

impl LiveDocument {
    pub fn parse(url: impl Into<String>, markup: &str) -> Rc<Self> {
        Self::with_bus(url, markup, DocumentBus::default())
    }

    pub fn with_bus(url: impl Into<String>, markup: &str, bus: DocumentBus) -> Rc<Self> {
        Rc::new(Self {
            url: url.into(),
            html: RefCell::new(Html::parse_document(markup)),
            revision: Cell::new(0),
            bus,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    pub fn bus(&self) -> &DocumentBus {
        &self.bus
    }

    /// Borrows the current tree. Never hold the borrow across an await.
    pub fn with_html<R>(&self, f: impl FnOnce(&Html) -> R) -> R {
        f(&self.html.borrow())
    }

    pub fn element_count(&self) -> usize {
        self.with_html(count_elements)
    }

    /// Fires `event_type` at the first element matching `target_selector`.
    /// Returns the number of receivers the event reached.
    pub fn dispatch(&self, event_type: EventType, target_selector: &str) -> ReactorResult<usize> {
        let selector =
            Selector::parse(target_selector).map_err(|err| ReactorError::InvalidSelector {
                selector: target_selector.to_string(),
                message: err.to_string(),
            })?;
        let target = self
            .with_html(|html| html.select(&selector).next().map(capture_target))
            .ok_or_else(|| ReactorError::TargetNotFound(target_selector.to_string()))?;
        let path = target.segments.join(" > ");
        let event = DomEvent {
            event_type,
            target,
            revision: self.revision(),
        };
        let delivered = self.bus.dispatch(event);
        debug!(
            target: "excavator.live",
            event = %event_type,
            element = %path,
            delivered,
            "live.document.dispatched"
        );
        Ok(delivered)
    }

    /// Swaps the whole document and publishes one mutation batch.
    pub fn replace_markup(&self, markup: &str) -> MutationBatch {
        let next = Html::parse_document(markup);
        self.commit(next)
    }

    /// Replaces the body content, keeping the current head.
    pub fn set_body_markup(&self, body: &str) -> MutationBatch {
        let head = self.with_html(|html| {
            html.root_element()
                .children()
                .filter_map(ElementRef::wrap)
                .find(|element| element.value().name() == "head")
                .map(|head| head.inner_html())
                .unwrap_or_default()
        });
        let next = Html::parse_document(&format!(
            "<!DOCTYPE html><html><head>{head}</head><body>{body}</body></html>"
        ));
        self.commit(next)
    }

    fn commit(&self, next: Html) -> MutationBatch {
        let added_elements = count_elements(&next);
        let previous = self.html.replace(next);
        let removed_elements = count_elements(&previous);
        let revision = self.revision.get() + 1;
        self.revision.set(revision);
        let batch = MutationBatch {
            revision,
            removed_elements,
            added_elements,
        };
        let observers = self.bus.publish(batch);
        debug!(
            target: "excavator.live",
            revision,
            observers,
            "live.document.mutated"
        );
        batch
    }
}

impl fmt::Debug for LiveDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveDocument")
            .field("url", &self.url)
            .field("revision", &self.revision.get())
            .finish_non_exhaustive()
    }
}

fn count_elements(html: &Html) -> usize {
    html.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str =
        r#"<html><head><title>t</title></head><body><main><button class="go">Go</button></main></body></html>"#;

    #[test]
    fn dispatch_resolves_first_match_in_document_order() {
        let document = LiveDocument::parse("https://example.com/", PAGE);
        let mut capture = document.bus().add_event_listener(Phase::Capture);
        assert_eq!(
            document.dispatch(EventType::Click, "button.go").unwrap(),
            1
        );
        let event = capture.try_recv().unwrap();
        assert_eq!(event.event_type, EventType::Click);
        assert_eq!(event.revision, 0);
        assert_eq!(
            event.target.segments,
            vec!["html", "body", "main", "button.go"]
        );
        assert_eq!(event.target.label, "Go");
    }

    #[test]
    fn captured_target_survives_a_later_mutation() {
        let document = LiveDocument::parse("about:blank", PAGE);
        let mut capture = document.bus().add_event_listener(Phase::Capture);
        document.dispatch(EventType::Click, "button.go").unwrap();
        document.set_body_markup("<p>after</p>");

        let event = capture.try_recv().unwrap();
        assert_eq!(event.revision, 0);
        assert_eq!(document.revision(), 1);
        assert_eq!(event.target.markup, r#"<button class="go">Go</button>"#);
    }

    #[test]
    fn dispatch_reports_missing_or_invalid_targets() {
        let document = LiveDocument::parse("about:blank", PAGE);
        assert_eq!(
            document.dispatch(EventType::Click, "nav").unwrap_err(),
            ReactorError::TargetNotFound("nav".into())
        );
        assert!(matches!(
            document.dispatch(EventType::Click, "::").unwrap_err(),
            ReactorError::InvalidSelector { .. }
        ));
    }

    #[test]
    fn each_mutating_call_publishes_one_batch() {
        let document = LiveDocument::parse("about:blank", PAGE);
        let mut observer = document.bus().observe_mutations();
        let batch = document.set_body_markup("<p>a</p><p>b</p>");
        assert_eq!(batch.revision, 1);
        assert_eq!(observer.try_recv().unwrap(), batch);
        assert!(observer.try_recv().is_err());
        // html, head, title, body, 2 p
        assert_eq!(batch.added_elements, 6);
        assert_eq!(document.element_count(), 6);
        assert!(document.with_html(|html| html.html().contains("<title>t</title>")));
    }

    #[test]
    fn registrations_are_counted() {
        let document = LiveDocument::parse("about:blank", PAGE);
        let _a = document.bus().add_event_listener(Phase::Capture);
        let _b = document.bus().observe_mutations();
        assert_eq!(document.bus().listener_count(Phase::Capture), 1);
        assert_eq!(document.bus().listener_count(Phase::Bubble), 0);
        assert_eq!(document.bus().observer_count(), 1);
        document.bus().remove_event_listener(Phase::Capture);
        document.bus().disconnect_observer();
        document.bus().disconnect_observer();
        assert_eq!(document.bus().listener_count(Phase::Capture), 0);
        assert_eq!(document.bus().observer_count(), 0);
    }

    #[test]
    fn event_type_parses_aliases() {
        assert_eq!("mouseenter".parse::<EventType>(), Ok(EventType::PointerEnter));
        assert_eq!("CLICK".parse::<EventType>(), Ok(EventType::Click));
        assert!("scroll".parse::<EventType>().is_err());
    }
}
