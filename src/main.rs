use anyhow::{Context, Result};
use clap::Parser;
use codedock::app;
use codedock::code::CodeStore;
use codedock::config::{self, Config};
use codedock::dify::{DifyClient, WorkflowRunner};
use codedock::route::Route;
use codedock::store::Store;
use codedock::ui::App;
use codedock::workspace::Workspace;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "codedock",
    about = "A terminal code assistant backed by a Dify workflow",
    version
)]
struct Args {
    /// Directory for files, code and stored results
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Start at a location, e.g. /assistant or /result?rid=<id>
    #[arg(long, value_name = "LOCATION")]
    open: Option<String>,

    /// Store the Dify API key in the system keychain and exit
    #[arg(long)]
    setup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.setup {
        if let Err(e) = config::setup_api_key_interactive() {
            eprintln!("  Setup failed: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let route = match args.open.as_deref().map(Route::parse).transpose() {
        Ok(route) => route.unwrap_or_default(),
        Err(e) => {
            eprintln!("  {}", e);
            std::process::exit(2);
        }
    };

    let config = Config::load();
    let data_dir = config.resolve_data_dir(args.data_dir);
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    init_logging(&data_dir)?;

    let api_key = config.get_api_key();
    if api_key.is_none() {
        eprintln!(
            "  No Dify API key found. Set {} or run 'codedock --setup'.",
            config::API_KEY_ENV
        );
    }

    let store = Store::new(&data_dir);
    let code = CodeStore::load(&store, config.save_debounce());
    let workspace = Workspace::open(store);

    let client = DifyClient::new(config.endpoint.clone(), api_key);
    info!(endpoint = client.endpoint(), route = %route, "starting");

    let mut app = App::new(workspace, code, route);
    app.user_prefix = config.user_prefix.clone();
    app.api_ready = client.has_api_key();

    let runner: Arc<dyn WorkflowRunner> = Arc::new(client);
    app::run_tui(app, runner, config.refresh_interval()).await
}

/// Log to a file in the data directory; the terminal belongs to the UI.
fn init_logging(data_dir: &Path) -> Result<()> {
    let log_path = data_dir.join("codedock.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
