use crate::output::{OutputMode, render};
use bugtrack_cli::{ApiClient, BugBoard};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Bug id.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct Deleted<'a> {
    id: &'a str,
    deleted: bool,
}

pub fn run_delete(
    args: &DeleteArgs,
    board: &mut BugBoard<ApiClient>,
    output: OutputMode,
) -> anyhow::Result<()> {
    board.delete(&args.id)?;
    render(
        output,
        &Deleted {
            id: &args.id,
            deleted: true,
        },
        |value, w| writeln!(w, "Deleted {}", value.id),
    )
}
