//! CodeType entrypoint.
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Once,
};

use clap::Parser;
use derive_more::From;
use thiserror::Error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::{
    app::App,
    catalog::CatalogError,
    config::{Config, ConfigError},
};

mod app;
mod catalog;
mod config;
mod page;
mod utils;

const LOG_FILE: &str = "codetype.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "codetype", version, about = "A code typing trainer for your terminal")]
struct Args {
    /// Configuration directory (defaults to the platform's config location)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Start practicing this language right away
    #[arg(long, short)]
    language: Option<String>,

    /// Length of a run in seconds
    #[arg(long, short)]
    time: Option<u32>,

    /// Print the available languages and exit
    #[arg(long)]
    list_languages: bool,
}

#[derive(Debug, From, Error)]
enum AppError {
    #[error("{0}")]
    Config(ConfigError),

    #[error("{0}")]
    Catalog(CatalogError),

    #[error("Terminal error: {0}")]
    Io(std::io::Error),

    #[error("Failed to create log directory '{directory}': {error}")]
    #[from(skip)]
    LogDirectory {
        directory: PathBuf,
        error: std::io::Error,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("codetype: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    let mut config = Config::get(args.config)?;

    if args.list_languages {
        for language in config.catalog.languages() {
            let count = config.catalog.snippets(language).map_or(0, <[String]>::len);
            println!("{language} ({count} snippets)");
        }
        return Ok(());
    }

    if let Some(time) = args.time {
        if time == 0 {
            return Err(ConfigError::ZeroTimeBudget.into());
        }
        config.settings.time_budget_seconds = time;
    }

    if let Some(language) = &args.language
        && !config.catalog.contains(language)
    {
        return Err(CatalogError::UnknownLanguage(language.clone()).into());
    }

    let _log_guard = configure_logging(&config.log_dir())?;
    install_panic_hook();

    info!(
        languages = config.catalog.languages().len(),
        time_budget = config.settings.time_budget_seconds,
        language = args.language.as_deref(),
        "startup"
    );

    App::new(config, args.language.as_deref()).run()?;

    Ok(())
}

/// Log into a file in `log_dir`, the terminal belongs to the UI
///
/// The returned guard flushes the log when dropped.
fn configure_logging(log_dir: &Path) -> Result<Option<WorkerGuard>, AppError> {
    std::fs::create_dir_all(log_dir).map_err(|error| AppError::LogDirectory {
        directory: log_dir.to_path_buf(),
        error,
    })?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .is_ok();

    // Without a subscriber the guard is useless; dropping it shuts the writer down
    Ok(installed.then_some(guard))
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "codetype::panic", %info, "panic");
            default_panic(info);
        }));
    });
}
