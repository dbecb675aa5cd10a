// `notula pin` — pin or unpin a note.

use clap::Args;
use serde::Serialize;

use notula_common::note::NoteId;
use notula_common::task::TaskStatus;

use crate::commands::{block_on, open_notebook};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct PinArgs {
    /// Note ID to pin.
    pub id: String,

    /// Remove the pin instead of setting it.
    #[arg(long)]
    pub remove: bool,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct PinResult {
    pub id: String,
    pub is_pinned: bool,
    pub task_status: TaskStatus,
}

pub fn run(args: PinArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let pinned = !args.remove;

    let result = block_on(async {
        let notebook = open_notebook()?;
        let id = NoteId::from(args.id.as_str());
        let handle = notebook.set_pin(&id, pinned).await?;
        let task_status = handle.outcome().await;
        anyhow::Ok(PinResult { id: args.id.clone(), is_pinned: pinned, task_status })
    })?;

    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &PinResult) -> String {
    let verb = if result.is_pinned { "pinned" } else { "unpinned" };
    format!("{verb} note {} (sync: {})", result.id, result.task_status.as_str())
}
