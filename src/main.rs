#![forbid(unsafe_code)]
//! `file-encrypter`: pick a file in the terminal, encrypt or decrypt it in place.

mod tui;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use file_encrypter::{Config, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_KEY_FILE, DEFAULT_PREVIEW_LIMIT};

#[derive(Parser, Debug)]
#[command(
    name = "file-encrypter",
    version,
    about = "Pick a file and encrypt/decrypt it in place with a local AES-256-GCM key"
)]
struct Cli {
    /// Key file (created with a fresh random key if missing)
    #[arg(short = 'k', long = "key-file", env = "FILE_ENCRYPTER_KEY", default_value = DEFAULT_KEY_FILE)]
    key_file: PathBuf,

    /// Directory the file browser starts in
    #[arg(short = 'C', long = "dir", default_value = ".")]
    dir: PathBuf,

    /// Allowed file extension (repeatable). Default: txt, md, go, mod, sum
    #[arg(short = 'a', long = "allow", value_name = "EXT")]
    allow: Vec<String>,

    /// Show dot-files in the browser
    #[arg(long)]
    hidden: bool,

    /// Seconds a success message stays on screen
    #[arg(long = "message-ttl", value_name = "SECS", default_value_t = 5)]
    message_ttl: u64,

    /// Seconds an error message stays on screen
    #[arg(long = "error-ttl", value_name = "SECS", default_value_t = 5)]
    error_ttl: u64,

    /// Maximum bytes of the selected file shown in the preview
    #[arg(long = "preview-limit", value_name = "BYTES", default_value_t = DEFAULT_PREVIEW_LIMIT)]
    preview_limit: usize,

    /// Write log records to this file (the terminal is taken by the UI)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Config {
        let allow = if self.allow.is_empty() {
            DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            self.allow
        };
        Config {
            key_file: self.key_file,
            start_dir: self.dir,
            show_hidden: self.hidden,
            info_ttl: Duration::from_secs(self.message_ttl),
            error_ttl: Duration::from_secs(self.error_ttl),
            preview_limit: self.preview_limit,
            log_file: self.log_file,
            ..Config::default()
        }
        .with_allowed_extensions(allow)
    }
}

/// Log to `config.log_file` when set; otherwise to stderr, silent unless `RUST_LOG` is set.
fn init_logging(config: &Config) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder
                .filter_level(log::LevelFilter::Info)
                .parse_default_env()
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder
                .filter_level(log::LevelFilter::Off)
                .parse_default_env();
        }
    }
    builder.try_init().context("installing logger")?;
    Ok(())
}

fn main() -> Result<()> {
    let config = Cli::parse().into_config();
    init_logging(&config)?;
    log::info!("starting in {}", config.start_dir.display());

    // Background tasks run on the pool; the terminal loop stays on this thread.
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let _guard = runtime.enter();
    tui::run(config)
}
