use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use one_good_hour::backend::{self, Backend, Engine, LocalBackend, SocketBackend};
use one_good_hour::config::{self, Prefs};
use one_good_hour::logging;
use one_good_hour::tui::{self, theme::PRESETS, theme::ThemeEngine};

#[derive(Parser)]
#[command(
    name = "one-good-hour",
    version,
    about = "One timer, four tasks, one good hour"
)]
struct Cli {
    /// Unix socket of a running `serve` daemon (overrides the config file)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the terminal interface (default)
    Run,
    /// Run the reference backend as a daemon on a Unix socket
    Serve,
    /// Create ~/.one-good-hour/ and a default config.toml
    Init,
    /// List theme presets and mark the active one
    Themes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Init => {
            config::ensure_dirs()?;
            let path = config::config_path()?;
            if config::write_default(&path)? {
                println!("wrote {}", path.display());
            } else {
                println!("{} already exists, left untouched", path.display());
            }
            Ok(())
        }
        Commands::Themes => {
            let cfg = config::load()?;
            let themes = ThemeEngine::new(cfg.theme, Some(Prefs::open_default()?));
            for (i, preset) in PRESETS.iter().enumerate() {
                let marker = if i == themes.active() { "*" } else { " " };
                println!("{marker} {:<12} {}", preset.id, preset.name);
            }
            Ok(())
        }
        Commands::Serve => {
            logging::init_stderr()?;
            let cfg = config::load()?;
            let path = match cli.socket.or(cfg.backend.socket) {
                Some(path) => path,
                None => {
                    config::ensure_dirs()?;
                    config::socket_path()?
                }
            };
            runtime()?.block_on(backend::serve(&path))
        }
        Commands::Run => {
            config::ensure_dirs()?;
            let log_path = logging::init_file(&config::log_dir()?)?;
            let cfg = config::load()?;

            let socket = cli.socket.or_else(|| cfg.backend.socket.clone());
            let backend: Arc<dyn Backend> = match socket {
                Some(path) => {
                    tracing::info!(
                        socket = %path.display(),
                        log = %log_path.display(),
                        "using socket backend"
                    );
                    Arc::new(SocketBackend::new(path))
                }
                None => {
                    tracing::info!(log = %log_path.display(), "using in-process backend");
                    Arc::new(LocalBackend::new(Engine::new()))
                }
            };

            let prefs = Prefs::open_default()?;
            runtime()?.block_on(tui::run(backend, &cfg, Some(prefs)))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")
}
