//! `bugs status <id> <status>`: move a bug through its lifecycle.

use crate::output::{OutputMode, render_item};
use bugtrack_cli::{ApiClient, BugBoard};
use bugtrack_core::Status;
use clap::Args;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Bug id.
    pub id: String,

    /// New status: open, in-progress (doing), resolved (done).
    pub status: Status,
}

pub fn run_status(
    args: &StatusArgs,
    board: &mut BugBoard<ApiClient>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let updated = board.set_status(&args.id, args.status)?;
    render_item(&updated, output)?;
    Ok(())
}
