use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use doctor_core::{AnalysisClient, Config, FieldStore, FormController, JsonFileStore, MemoryStore};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "doctor-ai")]
#[command(about = "Patient intake form for the Doctor.AI analysis service")]
struct Cli {
    /// Analysis endpoint (overrides DOCTOR_AI_ENDPOINT and the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// File where form fields are saved between sessions
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Keep form fields in memory only
    #[arg(long, conflicts_with = "store")]
    no_persist: bool,

    /// Log file (default: <config dir>/doctor-ai/doctor-ai.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Clear saved form fields and exit
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.clone())?;

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });

    let endpoint = config.resolved_endpoint(cli.endpoint.clone());

    let mut store = open_store(&cli, &config)?;

    if cli.clear {
        store.clear()?;
        println!("Cleared saved form fields");
        return Ok(());
    }

    tracing::info!(%endpoint, "starting intake form");

    let controller = FormController::new(store);
    let client = AnalysisClient::new(&endpoint);
    let mut app = App::new(controller, client);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    app.check_health();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        app.poll_tasks().await;
    }

    Ok(())
}

fn open_store(cli: &Cli, config: &Config) -> Result<Box<dyn FieldStore>> {
    if cli.no_persist {
        return Ok(Box::new(MemoryStore::new()));
    }

    let path = match cli.store.clone().or_else(|| config.store_path.clone()) {
        Some(path) => path,
        None => JsonFileStore::default_path()?,
    };

    let store = JsonFileStore::open(&path)
        .with_context(|| format!("Could not open field store at {}", path.display()))?;
    tracing::info!(path = %store.path().display(), "using field store");
    Ok(Box::new(store))
}

/// The terminal is in raw mode while the form runs, so logs go to a file.
fn init_logging(log_file: Option<PathBuf>) -> Result<()> {
    let path = match log_file {
        Some(path) => path,
        None => Config::config_dir()?.join("doctor-ai.log"),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
