//! `bugs create`: validate locally, then submit.

use crate::output::{OutputMode, render_item};
use bugtrack_cli::{ApiClient, BugBoard, BugForm};
use clap::Args;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Short summary, at least 3 characters.
    #[arg(short, long)]
    pub title: String,

    /// Who found it.
    #[arg(short, long)]
    pub reporter: String,

    /// Steps to reproduce, expected and actual behaviour.
    #[arg(short, long, default_value = "")]
    pub description: String,

    #[arg(short, long, default_value = "")]
    pub assignee: String,

    /// low, medium (default) or high.
    #[arg(short, long, default_value = "")]
    pub priority: String,

    /// open (default), in-progress or resolved.
    #[arg(short, long, default_value = "")]
    pub status: String,

    /// Comma-separated, at most five: "ui, regression".
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Due date, e.g. 2024-05-01.
    #[arg(long = "due", value_name = "DATE", default_value = "")]
    pub due_date: String,
}

impl CreateArgs {
    pub fn to_form(&self) -> BugForm {
        BugForm {
            title: self.title.clone(),
            description: self.description.clone(),
            reporter: self.reporter.clone(),
            assignee: self.assignee.clone(),
            priority: self.priority.clone(),
            status: self.status.clone(),
            tags: self.tags.clone(),
            due_date: self.due_date.clone(),
        }
    }
}

pub fn run_create(
    args: &CreateArgs,
    board: &mut BugBoard<ApiClient>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let created = board.create(&args.to_form())?;
    render_item(&created, output)?;
    Ok(())
}
