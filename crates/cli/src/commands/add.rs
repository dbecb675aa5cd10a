// `notula add` — create a note locally and replay it to the remote.

use clap::Args;
use serde::Serialize;

use notula_common::note::Note;
use notula_common::task::TaskStatus;

use crate::commands::{block_on, open_notebook};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Note title.
    pub title: String,

    /// Note body.
    pub body: String,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct AddResult {
    pub note: Note,
    pub task_status: TaskStatus,
}

pub fn run(args: AddArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);

    let result = block_on(async {
        let notebook = open_notebook()?;
        let (note, handle) = notebook.add(&args.title, &args.body).await?;
        let task_status = handle.outcome().await;

        // A completed create rekeyed the note; show the durable row.
        let note = match notebook.get(&note.id).await? {
            Some(current) => current,
            None => notebook
                .list()
                .await?
                .into_iter()
                .find(|n| n.created_at == note.created_at && n.title == note.title)
                .unwrap_or(note),
        };

        anyhow::Ok(AddResult { note, task_status })
    })?;

    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &AddResult) -> String {
    format!("created note {} (sync: {})", result.note.id, result.task_status.as_str())
}
