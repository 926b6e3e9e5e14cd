use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Args;
use live_reactor::{
    BatchCallback, DocumentBus, EventType, LiveDocument, LiveOptions, LiveReactor,
    VirtualObjectHandle,
};
use serde::{Deserialize, Serialize};
use tokio::task::LocalSet;
use tracing::{info, warn};

use super::context::CliContext;
use super::excavate::read_text;
use super::output::OutputFormat;

/// Scheduler turns granted to the reactor after each step.
const SETTLE_ROUNDS: usize = 32;

#[derive(Args, Clone, Debug)]
pub struct ReplayArgs {
    /// Initial HTML document
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// JSON array of steps: {"type": "click"|"pointerenter", "selector": ..}
    /// or {"type": "set-body"|"replace", "markup": ..}
    #[arg(long, value_name = "FILE")]
    pub events: PathBuf,

    /// Document URL hashed into every handle
    #[arg(long, default_value = "about:blank")]
    pub url: String,

    /// Do not observe mutations
    #[arg(long)]
    pub no_mutations: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ReplayStep {
    Click {
        selector: String,
    },
    #[serde(rename = "pointerenter", alias = "mouseenter")]
    PointerEnter {
        selector: String,
    },
    SetBody {
        markup: String,
    },
    Replace {
        markup: String,
    },
}

/// One emitted handle, tagged with the step that produced it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRecord {
    pub step: usize,
    #[serde(flatten)]
    pub handle: VirtualObjectHandle,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutcome {
    pub records: Vec<ReplayRecord>,
    pub failed_steps: Vec<usize>,
}

pub async fn cmd_replay(args: ReplayArgs, ctx: &CliContext) -> Result<()> {
    let markup = read_text(&args.html).await?;
    let raw = read_text(&args.events).await?;
    let steps: Vec<ReplayStep> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse steps from {}", args.events.display()))?;

    let options = ctx.config().live.clone();
    let outcome = LocalSet::new()
        .run_until(replay_steps(
            &args.url,
            &markup,
            &steps,
            options,
            !args.no_mutations,
        ))
        .await;
    info!(
        steps = steps.len(),
        handles = outcome.records.len(),
        failed = outcome.failed_steps.len(),
        "replay finished"
    );

    match ctx.output() {
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&outcome.records)?);
        }
        OutputFormat::Human | OutputFormat::Json => {
            for record in &outcome.records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
    }
    Ok(())
}

/// Drives the reactor through `steps`. Must run inside a [`LocalSet`].
pub async fn replay_steps(
    url: &str,
    markup: &str,
    steps: &[ReplayStep],
    options: LiveOptions,
    observe_mutations: bool,
) -> ReplayOutcome {
    let document = LiveDocument::with_bus(url, markup, DocumentBus::new(options.channel_capacity));
    let emitted: Rc<RefCell<Vec<VirtualObjectHandle>>> = Rc::default();

    let snapshot_sink = Rc::clone(&emitted);
    let batch_sink = Rc::clone(&emitted);
    let on_batch: Option<BatchCallback> = observe_mutations.then(|| {
        Box::new(move |batch: Vec<VirtualObjectHandle>| batch_sink.borrow_mut().extend(batch))
            as BatchCallback
    });
    let subscription = LiveReactor::new(options).attach(
        Rc::clone(&document),
        move |handle| snapshot_sink.borrow_mut().push(handle),
        on_batch,
    );

    let mut outcome = ReplayOutcome::default();
    for (index, step) in steps.iter().enumerate() {
        let dispatched = match step {
            ReplayStep::Click { selector } => document.dispatch(EventType::Click, selector),
            ReplayStep::PointerEnter { selector } => {
                document.dispatch(EventType::PointerEnter, selector)
            }
            ReplayStep::SetBody { markup } => {
                document.set_body_markup(markup);
                Ok(0)
            }
            ReplayStep::Replace { markup } => {
                document.replace_markup(markup);
                Ok(0)
            }
        };
        if let Err(err) = dispatched {
            warn!(step = index, %err, "replay step failed");
            outcome.failed_steps.push(index);
            continue;
        }
        settle().await;
        let produced = std::mem::take(&mut *emitted.borrow_mut());
        outcome.records.extend(
            produced
                .into_iter()
                .map(|handle| ReplayRecord { step: index, handle }),
        );
    }

    subscription.stop().await;
    outcome
}

async fn settle() {
    for _ in 0..SETTLE_ROUNDS {
        tokio::task::yield_now().await;
    }
}
