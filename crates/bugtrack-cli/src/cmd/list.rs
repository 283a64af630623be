//! `bugs list`: every bug, newest first.

use crate::output::{OutputMode, render_list};
use bugtrack_cli::{ApiClient, BugBoard};
use bugtrack_core::Status;
use clap::Args;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show bugs in this status: open, in-progress, resolved.
    #[arg(short, long)]
    pub status: Option<Status>,
}

pub fn run_list(
    args: &ListArgs,
    board: &mut BugBoard<ApiClient>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let bugs: Vec<_> = board
        .bugs()?
        .iter()
        .filter(|bug| args.status.is_none_or(|status| bug.status == status))
        .cloned()
        .collect();

    if bugs.is_empty() && !output.is_json() {
        println!("No bugs found");
        return Ok(());
    }
    render_list(&bugs, output)?;
    Ok(())
}
