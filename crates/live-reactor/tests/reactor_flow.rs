use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use async_trait::async_trait;
use content_id::{
    ContentIdentifier, HashAlgorithm, HashPrimitive, IdentifierError, IdentifierResult,
};
use live_reactor::{
    attach, EventType, HiddenReason, LiveDocument, LiveOptions, LiveReactor, Phase,
    VirtualObjectHandle, MUTATION_EVENT,
};
use tokio::task::LocalSet;

const URL: &str = "https://shop.example.com/cart";
const PAGE: &str = r#"<html><head><title>Cart</title></head><body>
    <main id="app"><div class="row"><button class="btn primary">Checkout</button></div>
    <a class="link" href="/help">Help</a></main></body></html>"#;

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

fn collector() -> (Rc<RefCell<Vec<VirtualObjectHandle>>>, impl Fn(VirtualObjectHandle)) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |handle| sink.borrow_mut().push(handle))
}

#[tokio::test]
async fn click_emits_one_content_addressed_handle() {
    LocalSet::new()
        .run_until(async {
            let document = LiveDocument::parse(URL, PAGE);
            let (seen, on_snapshot) = collector();
            let _subscription =
                attach(Rc::clone(&document), LiveOptions::default(), on_snapshot, None);

            document.dispatch(EventType::Click, "button.btn").unwrap();
            settle().await;

            let seen = seen.borrow();
            assert_eq!(seen.len(), 1);
            let handle = &seen[0];
            assert_eq!(handle.event, "click");
            assert_eq!(
                handle.selector,
                "html > body > main#app > div.row > button.btn.primary"
            );
            assert_eq!(handle.label, "Checkout");
            assert_eq!(handle.id.len(), 64);
            assert!(handle.cid.as_str().starts_with('b'));
            assert!(!handle.reduced_strength);

            let wire = serde_json::to_value(handle).unwrap();
            assert_eq!(wire["kind"], "dom-node");
            assert_eq!(wire["cid"], handle.cid.as_str());
            assert!(wire["createdAt"].is_string());
            assert_eq!(wire["reducedStrength"], false);
            assert!(wire.get("reason").is_none());
        })
        .await;
}

#[tokio::test]
async fn same_interaction_same_id_and_event_type_changes_it() {
    LocalSet::new()
        .run_until(async {
            let document = LiveDocument::parse(URL, PAGE);
            let (seen, on_snapshot) = collector();
            let _subscription =
                attach(Rc::clone(&document), LiveOptions::default(), on_snapshot, None);

            document.dispatch(EventType::Click, "a.link").unwrap();
            document.dispatch(EventType::Click, "a.link").unwrap();
            document.dispatch(EventType::PointerEnter, "a.link").unwrap();
            settle().await;

            let seen = seen.borrow();
            assert_eq!(seen.len(), 3);
            assert_eq!(seen[0].id, seen[1].id);
            assert_eq!(seen[0].cid, seen[1].cid);
            assert_ne!(seen[0].id, seen[2].id);
        })
        .await;
}

#[tokio::test]
async fn click_followed_by_a_rewrite_still_emits_its_handle() {
    LocalSet::new()
        .run_until(async {
            let document = LiveDocument::parse(URL, PAGE);
            let (seen, on_snapshot) = collector();
            let _subscription =
                attach(Rc::clone(&document), LiveOptions::default(), on_snapshot, None);

            document.dispatch(EventType::Click, "button.btn").unwrap();
            document.set_body_markup("<p>after click</p>");
            settle().await;
            {
                let seen = seen.borrow();
                assert_eq!(seen.len(), 1);
                assert_eq!(
                    seen[0].selector,
                    "html > body > main#app > div.row > button.btn.primary"
                );
                assert_eq!(seen[0].label, "Checkout");
            }

            document.dispatch(EventType::Click, "p").unwrap();
            settle().await;
            assert_eq!(seen.borrow().len(), 2);
            assert_eq!(seen.borrow()[1].selector, "html > body > p");
        })
        .await;
}

#[tokio::test]
async fn handle_id_ignores_mutations_between_dispatch_and_hashing() {
    LocalSet::new()
        .run_until(async {
            let document = LiveDocument::parse(URL, PAGE);
            let (seen, on_snapshot) = collector();
            let _subscription =
                attach(Rc::clone(&document), LiveOptions::default(), on_snapshot, None);

            document.dispatch(EventType::Click, "a.link").unwrap();
            settle().await;
            document.dispatch(EventType::Click, "a.link").unwrap();
            document.replace_markup("<html><body></body></html>");
            settle().await;

            let seen = seen.borrow();
            assert_eq!(seen.len(), 2);
            assert_eq!(seen[0].id, seen[1].id);
        })
        .await;
}

#[tokio::test]
async fn panicking_callback_does_not_deregister_the_listener() {
    LocalSet::new()
        .run_until(async {
            let document = LiveDocument::parse(URL, PAGE);
            let calls = Rc::new(Cell::new(0usize));
            let counter = Rc::clone(&calls);
            let _subscription = attach(
                Rc::clone(&document),
                LiveOptions::default(),
                move |_handle| {
                    counter.set(counter.get() + 1);
                    if counter.get() == 1 {
                        panic!("consumer bug");
                    }
                },
                None,
            );

            document.dispatch(EventType::Click, "button").unwrap();
            settle().await;
            document.dispatch(EventType::Click, "button").unwrap();
            settle().await;
            assert_eq!(calls.get(), 2);
            assert_eq!(document.bus().listener_count(Phase::Capture), 1);
        })
        .await;
}

#[tokio::test]
async fn dispose_is_idempotent_and_silences_callbacks() {
    LocalSet::new()
        .run_until(async {
            let document = LiveDocument::parse(URL, PAGE);
            let (seen, on_snapshot) = collector();
            let mut subscription = attach(
                Rc::clone(&document),
                LiveOptions::default(),
                on_snapshot,
                Some(Box::new(|_batch: Vec<VirtualObjectHandle>| {})),
            );
            assert_eq!(document.bus().listener_count(Phase::Capture), 1);
            assert_eq!(document.bus().observer_count(), 1);

            subscription.dispose();
            subscription.dispose();
            assert!(subscription.is_disposed());
            assert_eq!(document.bus().listener_count(Phase::Capture), 0);
            assert_eq!(document.bus().observer_count(), 0);

            let _ = document.dispatch(EventType::Click, "button");
            settle().await;
            assert!(seen.borrow().is_empty());
            drop(subscription);
            assert_eq!(document.bus().listener_count(Phase::Capture), 0);
        })
        .await;
}

#[tokio::test]
async fn mutation_batches_report_hidden_text_once_per_coalesced_batch() {
    LocalSet::new()
        .run_until(async {
            let document = LiveDocument::parse(URL, PAGE);
            let batches: Rc<RefCell<Vec<Vec<VirtualObjectHandle>>>> = Rc::default();
            let sink = Rc::clone(&batches);
            let _subscription = attach(
                Rc::clone(&document),
                LiveOptions::default(),
                |_handle| {},
                Some(Box::new(move |batch: Vec<VirtualObjectHandle>| {
                    sink.borrow_mut().push(batch)
                })),
            );

            document.set_body_markup("<p>first</p>");
            document.set_body_markup(
                r#"<p>shown</p><div hidden>secret</div><span aria-hidden="true"></span>"#,
            );
            settle().await;

            let batches = batches.borrow();
            assert_eq!(batches.len(), 1);
            let batch = &batches[0];
            assert_eq!(batch.len(), 1);
            assert_eq!(batch[0].event, MUTATION_EVENT);
            assert_eq!(batch[0].reason, Some(HiddenReason::HiddenAttribute));
            assert_eq!(batch[0].label, "secret");
        })
        .await;
}

#[tokio::test]
async fn stop_waits_for_the_loop_and_releases_registrations() {
    LocalSet::new()
        .run_until(async {
            let document = LiveDocument::parse(URL, PAGE);
            let subscription = attach(Rc::clone(&document), LiveOptions::default(), |_| {}, None);
            subscription.stop().await;
            assert_eq!(document.bus().listener_count(Phase::Capture), 0);
        })
        .await;
}

struct Unavailable;

#[async_trait]
impl HashPrimitive for Unavailable {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }

    async fn digest(&self, _payload: &[u8]) -> IdentifierResult<Vec<u8>> {
        Err(IdentifierError::PrimitiveUnavailable("no crypto".into()))
    }
}

#[tokio::test]
async fn unavailable_primitive_marks_handles_reduced_strength() {
    LocalSet::new()
        .run_until(async {
            let document = LiveDocument::parse(URL, PAGE);
            let (seen, on_snapshot) = collector();
            let _subscription = LiveReactor::new(LiveOptions::default())
                .with_identifier(ContentIdentifier::new(Arc::new(Unavailable)))
                .attach(Rc::clone(&document), on_snapshot, None);

            document.dispatch(EventType::PointerEnter, "button").unwrap();
            settle().await;

            let seen = seen.borrow();
            assert_eq!(seen.len(), 1);
            assert!(seen[0].reduced_strength);
            assert_eq!(seen[0].cid.algorithm(), Some(HashAlgorithm::Fallback));
        })
        .await;
}
