// `notula rm` — delete a note locally and, if the server knows it,
// remotely.

use clap::Args;
use serde::Serialize;

use notula_common::note::NoteId;
use notula_common::task::TaskStatus;

use crate::commands::{block_on, open_notebook};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct RmArgs {
    /// Note ID to delete.
    pub id: String,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct RmResult {
    pub id: String,
    /// Absent when the note never reached the server.
    pub task_status: Option<TaskStatus>,
}

pub fn run(args: RmArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);

    let result = block_on(async {
        let notebook = open_notebook()?;
        let id = NoteId::from(args.id.as_str());
        let task_status = match notebook.delete(&id).await? {
            Some(handle) => Some(handle.outcome().await),
            None => None,
        };
        anyhow::Ok(RmResult { id: args.id.clone(), task_status })
    })?;

    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &RmResult) -> String {
    match result.task_status {
        Some(status) => format!("deleted note {} (sync: {})", result.id, status.as_str()),
        None => format!("deleted note {} (local only, never synced)", result.id),
    }
}
