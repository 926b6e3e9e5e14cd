use anyhow::Result;
use serde::Serialize;

use super::context::CliContext;
use super::output::emit_structured;
use crate::config::ExcavatorConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildInfo<'a> {
    version: &'static str,
    build_date: &'static str,
    git_hash: &'static str,
    git_branch: &'static str,
    config_path: String,
    config_loaded: bool,
    env_overrides: &'a [String],
    config: &'a ExcavatorConfig,
}

pub fn cmd_info(ctx: &CliContext) -> Result<()> {
    let info = BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_date: env!("BUILD_DATE"),
        git_hash: env!("GIT_HASH"),
        git_branch: env!("GIT_BRANCH"),
        config_path: ctx.config_path().display().to_string(),
        config_loaded: ctx.config_from_file(),
        env_overrides: ctx.overrides(),
        config: ctx.config(),
    };
    if emit_structured(ctx.output(), &info)? {
        return Ok(());
    }

    println!("Excavator System Information");
    println!("============================");
    println!("Version: {}", info.version);
    println!("Build Date: {}", info.build_date);
    println!("Git Commit: {} ({})", info.git_hash, info.git_branch);
    println!();

    let config = info.config;
    println!("Configuration:");
    if info.config_loaded {
        println!("- File: {}", info.config_path);
    } else {
        println!("- File: {} (not found, defaults)", info.config_path);
    }
    if !info.env_overrides.is_empty() {
        println!("- Environment overrides: {}", info.env_overrides.join(", "));
    }
    println!("- Output Directory: {}", config.output_dir.display());
    println!(
        "- Excavate: maxDepth={} maxArraySample={} maxStringExample={} styles={}",
        config.excavate.max_depth,
        config.excavate.max_array_sample,
        config.excavate.max_string_example,
        config.excavate.inspect_styles
    );
    println!(
        "- Live: batchLimit={} maxContentBytes={} algorithm={}",
        config.live.batch_limit, config.live.max_content_bytes, config.live.algorithm
    );
    println!(
        "- Hash: algorithm={} codec={:?} gateway={}",
        config.hash.algorithm, config.hash.codec, config.hash.gateway
    );
    Ok(())
}
