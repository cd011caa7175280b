// Grammar Chat - core library and terminal runtime

pub mod commands;
mod constants;
pub mod correction;
pub mod errors;
pub mod filter;
pub mod history;
pub mod language;
mod paths;
pub mod projector;
pub mod runtime;
pub mod session;
pub mod state;
pub mod storage;
pub mod terminal;
pub mod transcript;
pub mod turn;
mod util;

use clap::Parser;
use correction::{CorrectionService, HttpCorrectionClient};
use errors::AppError;
use history::HistoryStore;
use language::Language;
use runtime::{spawn_stdin_reader, Runtime};
use session::ChatSession;
use state::{load_settings, save_settings_file, Settings, SETTINGS_FILE};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::FileStore;
use terminal::{Console, JsonSurface, TerminalSurface};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE_NAME: &str = "grammar-chat.log";

#[derive(Parser, Debug)]
#[command(
    name = "grammar-chat",
    version,
    about = "Check sentences against a grammar-correction service"
)]
pub struct Cli {
    /// Correction service URL (form POST, JSON reply)
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Explanation language for new sentences: en, es, fr, de or bn
    #[arg(long)]
    pub language: Option<String>,
    /// Where search history is kept
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Where settings.json is read from
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
    /// Log filter used when RUST_LOG is not set
    #[arg(long)]
    pub log_level: Option<String>,
    /// Also write logs to grammar-chat.log in the data directory
    #[arg(long)]
    pub log_to_file: bool,
    /// Print one JSON object per UI update instead of the transcript
    #[arg(long)]
    pub json: bool,
}

/// Settings file, then environment, then command line.
pub fn resolve_settings(cli: &Cli, config_dir: &Path) -> Result<Settings, AppError> {
    let mut settings = load_settings(config_dir);
    settings.apply_env();
    settings.normalize();

    if let Some(endpoint) = &cli.endpoint {
        let endpoint = endpoint.trim();
        url::Url::parse(endpoint)
            .map_err(|e| AppError::Config(format!("Invalid --endpoint '{}': {}", endpoint, e)))?;
        settings.endpoint = endpoint.to_string();
    }
    if let Some(code) = &cli.language {
        let lang = Language::from_code(code)
            .ok_or_else(|| AppError::Config(format!("Unknown --language '{}'", code)))?;
        settings.default_language = lang.code().to_string();
    }
    if let Some(level) = &cli.log_level {
        settings.log_level = level.trim().to_string();
    }
    if cli.log_to_file {
        settings.log_to_file = true;
    }
    Ok(settings)
}

/// Logs go to stderr so they never interleave with the transcript on stdout.
/// The returned guard flushes the file writer and must outlive the session.
fn init_logging(level: &str, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    info!("Grammar Chat starting up");
    guard
}

fn load_local_env() {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    load_env_files(&cwd);
}

/// `.env.local` then `.env`, in `start` and its parent. Existing variables win.
fn load_env_files(start: &Path) {
    let mut candidates = vec![start.join(".env.local"), start.join(".env")];
    if let Some(parent) = start.parent() {
        candidates.push(parent.join(".env.local"));
        candidates.push(parent.join(".env"));
    }

    for path in candidates {
        if !path.exists() {
            continue;
        }
        if let Ok(raw) = fs::read_to_string(&path) {
            for line in raw.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let mut parts = line.splitn(2, '=');
                let key = parts.next().unwrap_or("").trim();
                let value = parts.next().unwrap_or("").trim().trim_matches('"');
                if key.is_empty() || value.is_empty() {
                    continue;
                }
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

fn start<S: Console>(runtime: Runtime<S>) {
    spawn_stdin_reader(runtime.sender());
    let _ = runtime.run();
}

pub fn run() {
    load_local_env();
    let cli = Cli::parse();

    let config_dir = paths::resolve_config_dir(cli.config_dir.clone());
    let data_dir = paths::resolve_data_dir(cli.data_dir.clone());
    let settings = match resolve_settings(&cli, &config_dir) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", e.title(), e.message());
            if let Some(hint) = e.user_message() {
                eprintln!("{}", hint);
            }
            std::process::exit(2);
        }
    };

    let _log_guard = init_logging(
        &settings.log_level,
        settings.log_to_file.then_some(data_dir.as_path()),
    );
    info!(
        "Endpoint {}, config {}, data {}",
        settings.endpoint,
        config_dir.display(),
        data_dir.display()
    );

    if !config_dir.join(SETTINGS_FILE).exists() {
        if let Err(e) = save_settings_file(&config_dir, &Settings::default()) {
            warn!("Could not write default settings: {}", e);
        }
    }

    let history = HistoryStore::load(Box::new(FileStore::new(data_dir)));
    let session = ChatSession::new(history, &settings.default_language);
    let service: Arc<dyn CorrectionService> =
        Arc::new(HttpCorrectionClient::new(settings.endpoint.clone()));

    if cli.json {
        start(Runtime::new(session, JsonSurface::stdout(), service));
    } else {
        let mut surface = TerminalSurface::stdout();
        surface.notice("Grammar Chat. Type a sentence, or /help for commands.");
        start(Runtime::new(session, surface, service));
    }
}
