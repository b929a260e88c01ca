use clap::{Parser, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use crossterm::event::{self, Event as CEvent};
use donation_tui::config::Config;
use donation_tui::pages::Page;
use donation_tui::services::{DonationBackend, FileBackend, HttpBackend};
use donation_tui::tui::{self, App, AppOptions, Tui};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

/// Terminal console for reviewing and moderating donation records
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Page to open first
    #[arg(long = "page", value_enum)]
    page: Option<Page>,
    /// Work offline on a JSON file of records (a bare array or a { data: [...] } envelope)
    #[arg(long = "load", value_name = "FILE")]
    load: Option<PathBuf>,
    /// API base URL (overrides the config file)
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    donation_tui::errors::init()?;
    donation_tui::logging::init_with(None, args.logging.map(Into::into))?;

    let cfg = match Config::from_path(args.config.as_ref()) {
        Ok(cfg) => cfg,
        Err(e) if args.config.is_some() => {
            return Err(e).wrap_err("Failed to read config file");
        }
        Err(e) => {
            warn!("Falling back to built-in settings: {e}");
            Config::embedded()?
        }
    };

    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| cfg.config.base_url.clone());
    let id_field = cfg.config.row_id_field.clone();

    let backend: Box<dyn DonationBackend> = match &args.load {
        Some(path) => Box::new(
            FileBackend::open(path, &id_field)
                .wrap_err_with(|| format!("Failed to load {}", path.display()))?,
        ),
        None => Box::new(
            HttpBackend::new(&base_url, &id_field, cfg.request_timeout())?
                .with_status_path(cfg.config.status_path.clone()),
        ),
    };
    info!(backend = backend.name(), base_url, "Starting");

    let options = AppOptions {
        page: args.page.unwrap_or(cfg.config.default_page),
        id_field,
        base_url,
        theme: cfg.theme(),
        keybindings: cfg.keybindings()?,
    };
    let mut app = App::new(backend, options)?;

    let mut terminal = tui::init_terminal()?;
    let res = run_app(&mut terminal, &mut app);
    tui::restore_terminal()?;

    if let Err(e) = &res {
        error!("Error: {e}");
    }
    res
}

fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(100))?
            && let CEvent::Key(key_event) = event::read()?
        {
            app.handle_key_event(key_event)?;
        }

        app.update()?;
        if app.should_quit() {
            break;
        }
    }
    Ok(())
}
