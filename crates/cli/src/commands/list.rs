// `notula list` — list local notes. Works fully offline.

use clap::Args;
use serde::Serialize;

use notula_common::note::Note;
use notula_engine::store::LocalStore;

use crate::commands::{block_on, open_store};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Force JSON output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct ListResult {
    pub notes: Vec<Note>,
}

pub fn run(args: ListArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);

    let result = block_on(async {
        let store = open_store()?;
        let notes = store.get_all().await?;
        anyhow::Ok(ListResult { notes })
    })?;

    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &ListResult) -> String {
    if result.notes.is_empty() {
        return "no notes".to_string();
    }

    let mut lines = Vec::with_capacity(result.notes.len());
    for note in &result.notes {
        let pin = if note.is_pinned { "*" } else { " " };
        let sync = if note.id.is_temporary() { " (unsynced)" } else { "" };
        lines.push(format!(
            "{pin} {}  {}  {}{sync}",
            note.id,
            note.created_at.format("%Y-%m-%d %H:%M"),
            note.title,
        ));
    }
    lines.join("\n")
}
