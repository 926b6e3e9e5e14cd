use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use chrono::Utc;
use content_id::{Codec, ContentId, ContentIdentifier, Digest};
use tokio::select;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::document::{DomEvent, LiveDocument, MutationBatch, Phase};
use crate::errors::ReactorResult;
use crate::events;
use crate::model::{HandleKind, LiveOptions, VirtualObjectHandle};
use crate::scan::{bound_snapshot, scan_hidden, ElementSnapshot, HiddenReason};

/// Event name hashed into handles produced by the mutation path.
pub const MUTATION_EVENT: &str = "mutation";

pub type SnapshotCallback = Box<dyn Fn(VirtualObjectHandle)>;
pub type BatchCallback = Box<dyn Fn(Vec<VirtualObjectHandle>)>;

struct ReactorContext {
    document: Rc<LiveDocument>,
    options: LiveOptions,
    identifier: ContentIdentifier,
    on_snapshot: SnapshotCallback,
    on_batch: Option<BatchCallback>,
    shutdown: CancellationToken,
}

pub struct LiveReactor {
    options: LiveOptions,
    identifier: Option<ContentIdentifier>,
}

impl LiveReactor {
    pub fn new(options: LiveOptions) -> Self {
        Self {
            options,
            identifier: None,
        }
    }

    /// Overrides the identifier built from `options.algorithm`.
    pub fn with_identifier(mut self, identifier: ContentIdentifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Registers a capture-phase listener and, when `on_batch` is given, a
    /// mutation observer. Must be called from within a `tokio::task::LocalSet`.
    pub fn attach(
        self,
        document: Rc<LiveDocument>,
        on_snapshot: impl Fn(VirtualObjectHandle) + 'static,
        on_batch: Option<BatchCallback>,
    ) -> Subscription {
        let identifier = self
            .identifier
            .unwrap_or_else(|| ContentIdentifier::for_algorithm(self.options.algorithm));
        let shutdown = CancellationToken::new();
        let mut listener = document.bus().add_event_listener(Phase::Capture);
        let observing = on_batch.is_some();
        let mut observer = observing.then(|| document.bus().observe_mutations());
        events::emit_attached(document.url(), observing);

        let ctx = Rc::new(ReactorContext {
            document: Rc::clone(&document),
            options: self.options,
            identifier,
            on_snapshot: Box::new(on_snapshot),
            on_batch,
            shutdown: shutdown.clone(),
        });

        let task = tokio::task::spawn_local(async move {
            loop {
                select! {
                    biased;
                    _ = ctx.shutdown.cancelled() => break,
                    received = listener.recv() => match received {
                        Ok(event) => {
                            if let Err(err) = handle_event(&ctx, event).await {
                                events::emit_handler_failure("event", &err);
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => events::emit_lagged("events", skipped),
                        Err(RecvError::Closed) => break,
                    },
                    received = next_batch(&mut observer) => {
                        match received {
                            Ok(_) => drain(&mut observer),
                            Err(RecvError::Lagged(skipped)) => events::emit_lagged("mutations", skipped),
                            Err(RecvError::Closed) => {
                                observer = None;
                                continue;
                            }
                        }
                        if let Err(err) = handle_mutations(&ctx).await {
                            events::emit_handler_failure("mutations", &err);
                        }
                    }
                }
            }
        });

        Subscription {
            document,
            shutdown,
            task: Some(task),
            observing,
            disposed: false,
        }
    }
}

/// [`LiveReactor::attach`] with a default identifier.
pub fn attach(
    document: Rc<LiveDocument>,
    options: LiveOptions,
    on_snapshot: impl Fn(VirtualObjectHandle) + 'static,
    on_batch: Option<BatchCallback>,
) -> Subscription {
    LiveReactor::new(options).attach(document, on_snapshot, on_batch)
}

/// Live registration on a document. Dropping it disposes it.
pub struct Subscription {
    document: Rc<LiveDocument>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
    observing: bool,
    disposed: bool,
}

impl Subscription {
    /// Idempotent. No callback fires after this returns.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.release();
    }

    /// Cancels the loop and waits for it to finish the event in hand.
    pub async fn stop(mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.release();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn release(&self) {
        let bus = self.document.bus();
        bus.remove_event_listener(Phase::Capture);
        if self.observing {
            bus.disconnect_observer();
        }
        events::emit_detached(self.document.url());
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn next_batch(
    observer: &mut Option<broadcast::Receiver<MutationBatch>>,
) -> Result<MutationBatch, RecvError> {
    match observer {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Folds already-queued notifications into the one being handled.
fn drain(observer: &mut Option<broadcast::Receiver<MutationBatch>>) {
    if let Some(rx) = observer {
        while rx.try_recv().is_ok() {}
    }
}

async fn handle_event(ctx: &ReactorContext, event: DomEvent) -> ReactorResult<()> {
    let current = ctx.document.revision();
    if event.revision != current {
        events::emit_superseded_target(event.event_type.as_str(), event.revision, current);
    }
    let snapshot = bound_snapshot(&event.target, &ctx.options);

    let event_name = event.event_type.as_str();
    // May suspend; nothing is published before the digest is ready.
    let digest = ctx
        .identifier
        .hash_parts(&[
            ctx.document.url(),
            event_name,
            snapshot.path.as_str(),
            snapshot.content.as_str(),
        ])
        .await?;
    if ctx.shutdown.is_cancelled() {
        return Ok(());
    }

    let handle = build_handle(&digest, ctx.options.codec, snapshot, event_name, None);
    events::emit_snapshot(event_name, &handle.selector, handle.reduced_strength);
    deliver("snapshot", || (ctx.on_snapshot)(handle));
    Ok(())
}

async fn handle_mutations(ctx: &ReactorContext) -> ReactorResult<()> {
    let Some(on_batch) = ctx.on_batch.as_ref() else {
        return Ok(());
    };
    let outcome = ctx
        .document
        .with_html(|html| scan_hidden(html, &ctx.options));

    let mut handles = Vec::with_capacity(outcome.hits.len());
    for hit in outcome.hits {
        let digest = ctx
            .identifier
            .hash_parts(&[
                ctx.document.url(),
                MUTATION_EVENT,
                hit.snapshot.path.as_str(),
                hit.snapshot.content.as_str(),
            ])
            .await?;
        handles.push(build_handle(
            &digest,
            ctx.options.codec,
            hit.snapshot,
            MUTATION_EVENT,
            Some(hit.reason),
        ));
    }
    events::emit_batch(outcome.examined, handles.len());
    if handles.is_empty() || ctx.shutdown.is_cancelled() {
        return Ok(());
    }
    deliver("batch", || on_batch(handles));
    Ok(())
}

fn build_handle(
    digest: &Digest,
    codec: Codec,
    snapshot: ElementSnapshot,
    event: &str,
    reason: Option<HiddenReason>,
) -> VirtualObjectHandle {
    VirtualObjectHandle {
        id: digest.hex(),
        cid: ContentId::from_digest(digest, codec),
        kind: HandleKind::DomNode,
        selector: snapshot.path,
        label: snapshot.label,
        event: event.to_string(),
        reason,
        created_at: Utc::now(),
        reduced_strength: digest.reduced_strength(),
    }
}

fn deliver(stage: &str, callback: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        events::emit_callback_panic(stage);
    }
}
