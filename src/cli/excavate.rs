use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use dom_inspector::Html;
use excavator_core_types::Value;
use excavator_engine::{ExcavationInput, ExcavationSummary, Excavator};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;

use super::context::CliContext;
use super::output::emit_structured;
use crate::report::{write_report, ExcavationReport, LocalSheets};

#[derive(Args, Clone, Debug)]
pub struct ExcavateArgs {
    /// JSON file holding the value to excavate (`-` reads stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// HTML document whose tag/class grouping is merged into the catalog
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Also inspect the document's style rules
    #[arg(long)]
    pub styles: bool,

    /// Directory receiving excavation-report.json
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the maximum recursion depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Override the number of array elements sampled
    #[arg(long)]
    pub max_array_sample: Option<usize>,

    /// Print the summary without writing the report file
    #[arg(long)]
    pub no_write: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExcavateOutcome<'a> {
    run_id: String,
    report_path: Option<PathBuf>,
    fingerprint: &'a str,
    summary: &'a ExcavationSummary,
}

pub async fn cmd_excavate(args: ExcavateArgs, ctx: &CliContext) -> Result<()> {
    if args.input.is_none() && args.html.is_none() {
        bail!("nothing to excavate: pass --input and/or --html");
    }
    if args.styles && args.html.is_none() {
        bail!("--styles requires --html");
    }

    let config = ctx.config();
    let mut options = config.excavate.clone();
    if let Some(depth) = args.max_depth {
        options.max_depth = depth;
    }
    if let Some(sample) = args.max_array_sample {
        options.max_array_sample = sample;
    }
    options.inspect_styles |= args.styles;

    let value = match &args.input {
        Some(path) => Some(read_value(path).await?),
        None => None,
    };
    let document = match &args.html {
        Some(path) => Some(Html::parse_document(&read_text(path).await?)),
        None => None,
    };

    let mut excavator = Excavator::new(options).with_dom_options(config.dom.clone());
    if let Some(html_path) = &args.html {
        excavator = excavator.with_sheet_source(LocalSheets::for_document(html_path));
    }
    let input = ExcavationInput {
        value,
        dom: document.as_ref(),
    };
    let report = ExcavationReport::new(excavator.excavate(input));

    let report_path = if args.no_write {
        None
    } else {
        let dir = args.output_dir.as_ref().unwrap_or(&config.output_dir);
        Some(write_report(dir, &report)?)
    };
    info!(
        run_id = %report.run_id,
        objects = report.result.summary.virtual_object_count,
        "excavation finished"
    );

    let outcome = ExcavateOutcome {
        run_id: report.run_id.to_string(),
        report_path,
        fingerprint: &report.result.fingerprint,
        summary: &report.result.summary,
    };
    if !emit_structured(ctx.output(), &outcome)? {
        print_human(&outcome);
    }
    Ok(())
}

fn print_human(outcome: &ExcavateOutcome<'_>) {
    let summary = outcome.summary;
    println!("Excavation {}", outcome.run_id);
    match &outcome.report_path {
        Some(path) => println!("Report: {}", path.display()),
        None => println!("Report: (not written)"),
    }
    let categories = summary
        .categories
        .iter()
        .map(|(category, count)| format!("{category}={count}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "Virtual objects: {} ({})",
        summary.virtual_object_count, categories
    );
    println!("Relationships: {}", summary.relationship_count);
    println!("Max depth reached: {}", summary.max_depth_reached);
    let truncation = &summary.truncation;
    println!(
        "Truncation: depth-limited={} cycles={} shared={} sampled-arrays={} truncated-strings={}",
        truncation.depth_limited,
        truncation.cycles,
        truncation.shared_references,
        truncation.sampled_arrays,
        truncation.truncated_strings
    );
    if summary.dom_nodes > 0 {
        println!("DOM nodes: {}", summary.dom_nodes);
        println!("Hot selectors: {}", summary.hot_selectors);
    }
    println!("Fingerprint: {}", outcome.fingerprint);
}

async fn read_value(path: &Path) -> Result<Value> {
    let text = if path == Path::new("-") {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("Failed to read stdin")?;
        buffer
    } else {
        read_text(path).await?
    };
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    Ok(Value::from_json(&json))
}

pub(crate) async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
