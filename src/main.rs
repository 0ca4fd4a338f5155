//! Zenith - A terminal markdown editor with live preview.
//!
//! # Usage
//!
//! ```bash
//! zenith notes.md
//! zenith --zen --theme light notes.md
//! zenith --drive-api-key KEY --save
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zenith::app::App;
use zenith::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use zenith::drive::HttpDrive;
use zenith::state::Theme;
use zenith::storage::LocalStorage;

/// A terminal markdown editor with live preview, outline and export
#[derive(Parser, Debug)]
#[command(name = "zenith", version, about, long_about = None)]
struct Cli {
    /// Markdown file to edit; created on first save if missing
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Color theme (light or dark)
    #[arg(long, value_name = "THEME")]
    theme: Option<Theme>,

    /// Start in zen mode (editor only)
    #[arg(long)]
    zen: bool,

    /// Google API key used to list Drive files
    #[arg(long, value_name = "KEY")]
    drive_api_key: Option<String>,

    /// Google OAuth access token to sign in with
    #[arg(long, value_name = "TOKEN", env = "ZENITH_DRIVE_TOKEN", hide_env_values = true)]
    drive_token: Option<String>,

    /// Directory for the stored draft and Drive session
    #[arg(long, value_name = "DIR")]
    storage_dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;
    tracing::debug!(zen = effective.zen, theme = ?effective.theme, "resolved flags");

    let storage = effective
        .storage_dir
        .clone()
        .or_else(LocalStorage::default_dir)
        .map(LocalStorage::new);
    if storage.is_none() {
        tracing::warn!("no storage directory available; state will not persist");
    }

    let drive = HttpDrive::new().context("Failed to build Drive client")?;
    let app = App::new(Arc::new(drive))
        .with_file(cli.file)
        .with_theme(effective.theme)
        .with_zen(effective.zen)
        .with_drive_api_key(effective.drive_api_key)
        .with_drive_token(cli.drive_token)
        .with_storage(storage)
        .with_config_paths(
            Some(global_path),
            local_path.exists().then_some(local_path),
        );

    app.run().context("Application error")
}
