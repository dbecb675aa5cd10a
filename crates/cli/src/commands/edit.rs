// `notula edit` — rewrite a note's title and body.

use clap::Args;
use serde::Serialize;

use notula_common::note::NoteId;
use notula_common::task::TaskStatus;

use crate::commands::{block_on, open_notebook};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Note ID to edit.
    pub id: String,

    /// New title.
    pub title: String,

    /// New body.
    pub body: String,

    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct EditResult {
    pub id: String,
    pub task_status: TaskStatus,
}

pub fn run(args: EditArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);

    let result = block_on(async {
        let notebook = open_notebook()?;
        let id = NoteId::from(args.id.as_str());
        let handle = notebook.update(&id, &args.title, &args.body).await?;
        let task_status = handle.outcome().await;
        anyhow::Ok(EditResult { id: args.id.clone(), task_status })
    })?;

    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &EditResult) -> String {
    format!("edited note {} (sync: {})", result.id, result.task_status.as_str())
}
