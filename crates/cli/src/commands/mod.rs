// CLI subcommand dispatch and engine wiring.
//
// Each mutating command applies its optimistic local write, then waits
// for the queued remote task and reports the terminal status. `list`
// works fully offline against the local database alone.

use std::future::Future;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Subcommand;

use notula_engine::config::{self, Config};
use notula_engine::notebook::Notebook;
use notula_engine::remote::http::HttpRemoteClient;
use notula_engine::remote::RemoteClient;
use notula_engine::session::Session;
use notula_engine::store::sqlite::SqliteStore;
use notula_engine::store::LocalStore;
use notula_engine::tasks::executor::TaskExecutor;
use notula_engine::tasks::manager::TaskManager;

pub mod add;
pub mod edit;
pub mod list;
pub mod pin;
pub mod rm;
pub mod sync;

#[derive(Subcommand)]
pub enum Command {
    /// Create a note
    Add(add::AddArgs),
    /// Edit a note's title and body
    Edit(edit::EditArgs),
    /// Delete a note
    Rm(rm::RmArgs),
    /// Pin or unpin a note
    Pin(pin::PinArgs),
    /// List local notes
    List(list::ListArgs),
    /// Pull the remote note set into the local store
    Sync(sync::SyncArgs),
}

pub fn run(command: Command) -> anyhow::Result<()> {
    init_tracing();
    match command {
        Command::Add(args) => add::run(args),
        Command::Edit(args) => edit::run(args),
        Command::Rm(args) => rm::run(args),
        Command::Pin(args) => pin::run(args),
        Command::List(args) => list::run(args),
        Command::Sync(args) => sync::run(args),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run a command future on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime should build")
        .block_on(future)
}

/// Open the sqlite store at the configured location.
pub(crate) fn open_store() -> anyhow::Result<Arc<SqliteStore>> {
    let db_path = config::default_db_path().context("could not determine home directory")?;
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open note database at `{}`", db_path.display()))?;
    Ok(Arc::new(store))
}

/// Wire the full engine: sqlite store, HTTP remote, task manager.
pub(crate) fn open_notebook() -> anyhow::Result<Notebook> {
    let cfg = Config::load();
    let Some(remote_url) = cfg.remote_url.clone() else {
        bail!("no `remote_url` configured; add one to ~/.notula/config.toml");
    };

    let store: Arc<dyn LocalStore> = open_store()?;
    let remote: Arc<dyn RemoteClient> = Arc::new(
        HttpRemoteClient::new(&remote_url, cfg.auth_token.clone())
            .context("failed to construct remote client")?,
    );
    let executor = TaskExecutor::new(Arc::clone(&store), remote, cfg.retry.to_policy());
    let manager = TaskManager::new(executor);

    Ok(Notebook::new(store, manager, Session::authenticated()))
}
