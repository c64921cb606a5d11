mod app;
mod backend;
mod catalog;
mod config;
mod domain;
mod focus;
mod handlers;
mod infra;
mod logging;
mod query;
mod selection;
mod settings;
mod store;
mod terminal;
mod ui;
mod view;

use crate::app::App;
use crate::backend::{BackendEvent, BackendTask, Worker, worker_loop};
use crate::config::AppConfig;
use crate::handlers::{handle_backend_event, handle_key_event, send_task};
use crate::infra::SystemOpener;
use crate::query::QueryState;
use crate::store::{FavoritesRepo, FileStore, MemoryStore, SettingsRepo, StateStore};
use crate::terminal::{Tui, restore_terminal, setup_terminal};
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// A searchable, categorized directory of your company's tools and docs.
#[derive(Debug, Parser)]
#[command(name = "resource-hub", version, about)]
struct Args {
    /// Catalog file (defaults to <config_dir>/resource-hub/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with this search query
    #[arg(long)]
    query: Option<String>,

    /// Start with this tag selected; repeat for more
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Print the filtered view to stdout and exit
    #[arg(long)]
    print: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "resource hub starting");

    let config = match AppConfig::load_or_builtin(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "failed to load config, using built-in catalog");
            eprintln!("failed to load config, using built-in catalog: {err:#}");
            AppConfig::builtin()
        }
    };

    let query = QueryState::new(args.query.unwrap_or_default(), args.tags);
    let mut app = App::new(&config, query);
    if app.catalog().is_empty() {
        tracing::warn!("catalog has no usable links");
    }
    let store = open_store();

    if args.print {
        let favorites = FavoritesRepo::new(store.clone()).get();
        let settings = SettingsRepo::new(store).get(app.defaults());
        app.apply_hydration(favorites, settings);
        print!("{}", ui::plain_text(&app));
        return Ok(());
    }

    let mut terminal = setup_terminal()?;
    let run_result = run_app(&mut terminal, app, store).await;
    restore_terminal(&mut terminal)?;

    if let Err(err) = run_result {
        tracing::error!(error = %format!("{err:#}"), "application error");
        eprintln!("{err:#}");
        std::process::exit(1);
    }

    tracing::info!("resource hub exited");
    Ok(())
}

/// Persisted state goes to the data directory; without one, this session's
/// changes are kept in memory only.
fn open_store() -> Arc<dyn StateStore> {
    match FileStore::in_data_dir() {
        Ok(store) => {
            tracing::debug!(dir = %store.dir().display(), "using file store");
            Arc::new(store)
        }
        Err(err) => {
            tracing::warn!(error = %err, "no data directory, favorites and settings will not persist");
            Arc::new(MemoryStore::default())
        }
    }
}

async fn run_app(terminal: &mut Tui, mut app: App, store: Arc<dyn StateStore>) -> Result<()> {
    let (task_tx, task_rx) = mpsc::unbounded_channel::<BackendTask>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<BackendEvent>();

    let worker = Worker {
        store,
        opener: Arc::new(SystemOpener),
        defaults: app.defaults().clone(),
    };
    tokio::spawn(worker_loop(worker, task_rx, event_tx));

    send_task(&task_tx, BackendTask::Hydrate)?;

    while !app.should_quit {
        while let Ok(event) = event_rx.try_recv() {
            handle_backend_event(&mut app, &task_tx, event)?;
        }

        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(100)).context("event poll failed")?
            && let Event::Key(key) = event::read().context("event read failed")?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(&mut app, key, &task_tx)?;
        }
    }

    Ok(())
}
