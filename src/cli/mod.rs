pub mod app;
pub mod cid;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod excavate;
pub mod info;
pub mod inspect;
pub mod output;
pub mod replay;
pub mod runtime;

pub use cid::{cmd_cid, CidArgs};
pub use excavate::{cmd_excavate, ExcavateArgs};
pub use inspect::{cmd_inspect_dom, InspectDomArgs};
pub use replay::{cmd_replay, ReplayArgs, ReplayStep};
