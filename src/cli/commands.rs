use clap::Subcommand;

use super::cid::CidArgs;
use super::excavate::ExcavateArgs;
use super::inspect::InspectDomArgs;
use super::replay::ReplayArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Excavate a JSON value and/or an HTML document into a virtual-object report
    Excavate(ExcavateArgs),

    /// Group an HTML document by tag and class, optionally with its style rules
    InspectDom(InspectDomArgs),

    /// Compute a content identifier for a payload
    Cid(CidArgs),

    /// Run the live reactor over a scripted event log
    Replay(ReplayArgs),

    /// Show build metadata and the effective configuration
    Info,
}
