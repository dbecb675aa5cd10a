// `notula sync` — pull the remote note set into the local store.

use clap::Args;
use serde::Serialize;

use notula_common::task::TaskStatus;

use crate::commands::{block_on, open_notebook};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub task_status: TaskStatus,
    pub note_count: usize,
}

pub fn run(args: SyncArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);

    let result = block_on(async {
        let notebook = open_notebook()?;
        let handle = notebook.sync();
        let task_status = handle.outcome().await;
        let note_count = notebook.list().await?.len();
        anyhow::Ok(SyncResult { task_status, note_count })
    })?;

    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &SyncResult) -> String {
    format!("sync {} ({} local notes)", result.task_status.as_str(), result.note_count)
}
