//! Runtime settings shared by the controller, the browser and the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default key file name, resolved against the working directory.
pub const DEFAULT_KEY_FILE: &str = "key.drm";

/// Extensions the browser accepts when none are configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["txt", "md", "go", "mod", "sum"];

/// Default number of bytes shown in the file preview (64 KiB).
pub const DEFAULT_PREVIEW_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub key_file: PathBuf,
    pub start_dir: PathBuf,
    /// Lower-case extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
    pub show_hidden: bool,
    /// How long success messages stay up.
    pub info_ttl: Duration,
    /// How long operation errors stay up.
    pub error_ttl: Duration,
    /// How long the "not valid" message for a rejected selection stays up.
    pub rejection_ttl: Duration,
    pub preview_limit: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_file: PathBuf::from(DEFAULT_KEY_FILE),
            start_dir: PathBuf::from("."),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            show_hidden: false,
            info_ttl: Duration::from_secs(5),
            error_ttl: Duration::from_secs(5),
            rejection_ttl: Duration::from_secs(2),
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            log_file: None,
        }
    }
}

impl Config {
    /// Set the allowed extensions, normalising `".TXT"` to `"txt"`.
    pub fn with_allowed_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = exts
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// `true` if `path` has one of the allowed extensions (case-insensitive).
    pub fn allows(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}
