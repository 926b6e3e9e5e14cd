use anyhow::Result;

use super::cid::cmd_cid;
use super::commands::Commands;
use super::context::CliContext;
use super::env::CliArgs;
use super::excavate::cmd_excavate;
use super::info::cmd_info;
use super::inspect::cmd_inspect_dom;
use super::replay::cmd_replay;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Excavate(args) => cmd_excavate(args, ctx).await,
        Commands::InspectDom(args) => cmd_inspect_dom(args, ctx).await,
        Commands::Cid(args) => cmd_cid(args, ctx).await,
        Commands::Replay(args) => cmd_replay(args, ctx).await,
        Commands::Info => cmd_info(ctx),
    }
}
