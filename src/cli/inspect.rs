use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use dom_inspector::{
    inspect_style_and_dom_with, DomInspector, DomSheet, GroupSummary, Html, StyleSummary,
};

use super::context::CliContext;
use super::excavate::read_text;
use super::output::emit_structured;
use crate::report::LocalSheets;

#[derive(Args, Clone, Debug)]
pub struct InspectDomArgs {
    /// HTML document to inspect
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Include stylesheets, selector statistics and hot selectors
    #[arg(long)]
    pub styles: bool,

    /// Number of groups listed per section in human output
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

pub async fn cmd_inspect_dom(args: InspectDomArgs, ctx: &CliContext) -> Result<()> {
    let markup = read_text(&args.html).await?;
    let document = Html::parse_document(&markup);
    let options = ctx.config().dom.clone();

    if args.styles {
        let sheets = LocalSheets::for_document(&args.html);
        let report = inspect_style_and_dom_with(&document, &options, &sheets);
        if !emit_structured(ctx.output(), &report)? {
            report.dom_sheets.iter().for_each(|sheet| print_sheet(sheet, args.top));
            print_styles(&report.styles, args.top);
        }
    } else {
        let inspection = DomInspector::new(options).inspect_document(&document);
        if !emit_structured(ctx.output(), &inspection)? {
            inspection
                .dom_sheets
                .iter()
                .for_each(|sheet| print_sheet(sheet, args.top));
        }
    }
    Ok(())
}

fn print_sheet(sheet: &DomSheet, top: usize) {
    println!("{} ({} elements)", sheet.id, sheet.total_nodes);
    print_groups("Tags", &sheet.tag_summaries, top);
    print_groups("Classes", &sheet.class_summaries, top);
}

fn print_groups(title: &str, groups: &[GroupSummary], top: usize) {
    println!("{title}:");
    if groups.is_empty() {
        println!("  (none)");
        return;
    }
    for group in groups.iter().take(top) {
        println!("  {:<32} {}", group.selector, group.count);
    }
    if groups.len() > top {
        println!("  ... {} more", groups.len() - top);
    }
}

fn print_styles(styles: &StyleSummary, top: usize) {
    println!("Stylesheets:");
    for sheet in &styles.stylesheets {
        let source = sheet.href.as_deref().unwrap_or("inline");
        match &sheet.error {
            Some(error) => println!("  {} {} ({:?}): {}", sheet.id, source, sheet.origin, error),
            None => println!(
                "  {} {} ({:?}): {} rules",
                sheet.id, source, sheet.origin, sheet.rule_count
            ),
        }
    }
    println!("Selectors: {}", styles.selectors.len());
    for stat in styles.selectors.iter().take(top) {
        let live = match stat.error {
            Some(_) => "-".to_string(),
            None => stat.live_matches.to_string(),
        };
        println!(
            "  {:<40} {:?}/{:?} live={}{}",
            stat.selector,
            stat.kind,
            stat.pattern,
            live,
            if stat.hot { " hot" } else { "" }
        );
    }
    if styles.hot_selectors.is_empty() {
        println!("Hot selectors: (none)");
    } else {
        println!("Hot selectors: {}", styles.hot_selectors.join(", "));
    }
}
