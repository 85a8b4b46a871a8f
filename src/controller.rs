//! The interaction state machine.
//!
//! [`AppController::update`] handles one [`AppEvent`] to completion and returns the
//! [`Effect`]s it wants run. It never blocks and never does file or crypto work
//! itself; results come back later as new events, possibly out of order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::Config;
use crate::event::{AppEvent, Effect, OperationId};
use crate::notify::{Notification, NotificationBoard, NotificationKind};
use crate::types::{EncrypterError, KEY_LEN, Key, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Browsing,
    FileOpened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    #[default]
    Pending,
    Encrypting,
    Decrypting,
    Done,
}

#[derive(Debug)]
struct InFlight {
    op: OperationId,
    path: PathBuf,
}

#[derive(Debug)]
pub struct AppController {
    state: AppState,
    command: Command,
    key: Option<Arc<Key>>,
    key_file: PathBuf,
    /// `key_file` with its directory resolved, for comparing against selections.
    key_path: PathBuf,
    file_path: Option<PathBuf>,
    file_contents: String,
    notifications: NotificationBoard,
    in_flight: Option<InFlight>,
    next_op: u64,
    info_ttl: Duration,
    error_ttl: Duration,
    rejection_ttl: Duration,
    preview_limit: usize,
    show_help: bool,
    quitting: bool,
}

impl AppController {
    pub fn new(config: &Config) -> Self {
        Self {
            state: AppState::default(),
            command: Command::default(),
            key: None,
            key_file: config.key_file.clone(),
            key_path: resolve_key_path(&config.key_file),
            file_path: None,
            file_contents: String::new(),
            notifications: NotificationBoard::default(),
            in_flight: None,
            next_op: 0,
            info_ttl: config.info_ttl,
            error_ttl: config.error_ttl,
            rejection_ttl: config.rejection_ttl,
            preview_limit: config.preview_limit,
            show_help: false,
            quitting: false,
        }
    }

    /// Effects to run once at startup.
    pub fn init(&self) -> Vec<Effect> {
        vec![Effect::LoadKey {
            path: self.key_file.clone(),
        }]
    }

    pub fn update(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::FileSelected(path) => self.on_file_selected(path),
            AppEvent::FileRejected(path) => self.on_file_rejected(path),
            AppEvent::KeyLoaded(key) => {
                if key.len() != KEY_LEN {
                    warn!(
                        "key file {} holds {} bytes; encryption needs {KEY_LEN}",
                        self.key_file.display(),
                        key.len()
                    );
                } else {
                    info!("key loaded from {}", self.key_file.display());
                }
                self.key = Some(Arc::new(key));
                Vec::new()
            }
            AppEvent::PreviewLoaded { path, text } => {
                if self.is_open(&path) {
                    self.file_contents = text;
                } else {
                    debug!("dropping preview for {}", path.display());
                }
                Vec::new()
            }
            AppEvent::EncryptRequested => self.on_encrypt_requested(),
            AppEvent::DecryptRequested => self.on_decrypt_requested(),
            AppEvent::BackRequested => {
                if self.state == AppState::FileOpened {
                    self.state = AppState::Browsing;
                    self.command = Command::Pending;
                }
                Vec::new()
            }
            AppEvent::HelpToggled => {
                self.show_help = !self.show_help;
                Vec::new()
            }
            AppEvent::QuitRequested => {
                self.quitting = true;
                Vec::new()
            }
            AppEvent::OperationSucceeded { op, path, outcome } => {
                self.on_succeeded(op, path, outcome)
            }
            AppEvent::OperationFailed { op, error } => self.on_failed(op, error),
            AppEvent::NotificationExpired { kind, id } => {
                if !self.notifications.expire(kind, id) {
                    debug!("ignoring stale clear {id} for {kind:?}");
                }
                Vec::new()
            }
        }
    }

    fn on_file_selected(&mut self, path: PathBuf) -> Vec<Effect> {
        if self.state != AppState::Browsing {
            debug!("ignoring selection of {} outside the browser", path.display());
            return Vec::new();
        }
        if path == self.key_path {
            return self.on_file_rejected(path);
        }
        info!("opened {}", path.display());
        self.state = AppState::FileOpened;
        self.command = Command::Pending;
        self.file_contents.clear();
        self.file_path = Some(path.clone());
        vec![Effect::LoadPreview {
            path,
            limit: self.preview_limit,
        }]
    }

    fn on_file_rejected(&mut self, path: PathBuf) -> Vec<Effect> {
        if self.state != AppState::Browsing {
            return Vec::new();
        }
        self.file_path = None;
        let ttl = self.rejection_ttl;
        self.post(
            NotificationKind::Error,
            EncrypterError::Selection(path).to_string(),
            ttl,
        )
    }

    fn on_encrypt_requested(&mut self) -> Vec<Effect> {
        match self.begin(Command::Encrypting) {
            Ok(Some((op, key, path))) => vec![Effect::Encrypt { op, key, path }],
            Ok(None) => Vec::new(),
            Err(e) => self.post_error(&e),
        }
    }

    fn on_decrypt_requested(&mut self) -> Vec<Effect> {
        match self.begin(Command::Decrypting) {
            Ok(Some((op, key, path))) => vec![Effect::Decrypt { op, key, path }],
            Ok(None) => Vec::new(),
            Err(e) => self.post_error(&e),
        }
    }

    /// Guard and bookkeeping shared by encrypt and decrypt requests.
    ///
    /// `Ok(None)` means the request is silently ignored.
    fn begin(
        &mut self,
        command: Command,
    ) -> Result<Option<(OperationId, Arc<Key>, PathBuf)>, EncrypterError> {
        if self.state != AppState::FileOpened {
            return Ok(None);
        }
        if let Some(running) = &self.in_flight {
            debug!(
                "ignoring {command:?}: {} still running on {}",
                running.op,
                running.path.display()
            );
            return Ok(None);
        }
        let Some(path) = self.file_path.clone() else {
            return Ok(None);
        };
        let key = self.key.clone().ok_or(EncrypterError::KeyNotLoaded)?;

        self.next_op += 1;
        let op = OperationId(self.next_op);
        info!("{op}: {command:?} {}", path.display());
        self.command = command;
        self.in_flight = Some(InFlight {
            op,
            path: path.clone(),
        });
        Ok(Some((op, key, path)))
    }

    /// Clear the in-flight marker if `op` is the running operation.
    fn finish(&mut self, op: OperationId) -> bool {
        if self.in_flight.as_ref().is_some_and(|r| r.op == op) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    fn on_succeeded(
        &mut self,
        op: OperationId,
        path: PathBuf,
        outcome: Outcome,
    ) -> Vec<Effect> {
        self.finish(op);
        info!("{op}: {outcome} ({})", path.display());
        if self.is_open(&path) {
            self.state = AppState::Browsing;
            self.command = Command::Done;
        } else {
            debug!("{op} finished after {} was closed", path.display());
        }
        let ttl = self.info_ttl;
        self.post(NotificationKind::Info, outcome.message(), ttl)
    }

    fn on_failed(&mut self, op: Option<OperationId>, error: EncrypterError) -> Vec<Effect> {
        match op {
            Some(op) => {
                warn!("{op} failed: {error}");
                if self.finish(op)
                    && matches!(self.command, Command::Encrypting | Command::Decrypting)
                {
                    self.command = Command::Pending;
                }
            }
            None => warn!("{error}"),
        }
        self.post_error(&error)
    }

    fn post_error(&mut self, error: &EncrypterError) -> Vec<Effect> {
        let ttl = self.error_ttl;
        self.post(NotificationKind::Error, error.to_string(), ttl)
    }

    fn post(
        &mut self,
        kind: NotificationKind,
        text: impl Into<String>,
        ttl: Duration,
    ) -> Vec<Effect> {
        let id = self.notifications.post(kind, text, ttl);
        vec![Effect::ScheduleClear {
            kind,
            id,
            after: ttl,
        }]
    }

    fn is_open(&self, path: &Path) -> bool {
        self.state == AppState::FileOpened && self.file_path.as_deref() == Some(path)
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_deref()
    }

    pub fn key_file(&self) -> &Path {
        &self.key_file
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn file_contents(&self) -> &str {
        &self.file_contents
    }

    /// `true` while an encrypt or decrypt task is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn notification(&self, kind: NotificationKind) -> Option<&Notification> {
        self.notifications.current(kind)
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn should_quit(&self) -> bool {
        self.quitting
    }
}

/// Resolve the key file's directory so it compares equal to browser paths.
fn resolve_key_path(key_file: &Path) -> PathBuf {
    let dir = match key_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (fs::canonicalize(dir), key_file.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => key_file.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> AppController {
        AppController::new(&Config::default())
    }

    fn key() -> Key {
        Key::from_bytes(vec![7u8; KEY_LEN])
    }

    fn opened(path: &str) -> AppController {
        let mut app = controller();
        app.update(AppEvent::KeyLoaded(key()));
        let effects = app.update(AppEvent::FileSelected(PathBuf::from(path)));
        assert!(matches!(effects.as_slice(), [Effect::LoadPreview { .. }]));
        app
    }

    fn op_of(effects: &[Effect]) -> OperationId {
        match effects {
            [Effect::Encrypt { op, .. }] | [Effect::Decrypt { op, .. }] => *op,
            other => panic!("expected one dispatch, got {other:?}"),
        }
    }

    #[test]
    fn init_loads_the_key() {
        let app = controller();
        assert_eq!(
            app.init(),
            vec![Effect::LoadKey {
                path: PathBuf::from("key.drm")
            }]
        );
        assert_eq!(app.state(), AppState::Browsing);
        assert_eq!(app.command(), Command::Pending);
    }

    #[test]
    fn selecting_a_file_opens_it_and_requests_a_preview() {
        let mut app = opened("/tmp/notes.txt");
        assert_eq!(app.state(), AppState::FileOpened);
        assert_eq!(app.file_path(), Some(Path::new("/tmp/notes.txt")));

        app.update(AppEvent::PreviewLoaded {
            path: PathBuf::from("/tmp/notes.txt"),
            text: "hello".into(),
        });
        assert_eq!(app.file_contents(), "hello");

        app.update(AppEvent::PreviewLoaded {
            path: PathBuf::from("/tmp/other.txt"),
            text: "stale".into(),
        });
        assert_eq!(app.file_contents(), "hello");
    }

    #[test]
    fn rejected_selection_posts_short_lived_error() {
        let mut app = controller();
        let effects = app.update(AppEvent::FileRejected(PathBuf::from("image.png")));
        assert_eq!(app.state(), AppState::Browsing);
        assert!(app.file_path().is_none());
        let err = app.notification(NotificationKind::Error).unwrap();
        assert_eq!(err.text, "image.png is not valid.");
        assert!(matches!(
            effects.as_slice(),
            [Effect::ScheduleClear { kind: NotificationKind::Error, after, .. }]
                if *after == Duration::from_secs(2)
        ));
    }

    #[test]
    fn selecting_the_key_file_is_rejected() {
        let mut app = controller();
        let key_path = resolve_key_path(Path::new("key.drm"));
        app.update(AppEvent::FileSelected(key_path));
        assert_eq!(app.state(), AppState::Browsing);
        assert!(app.notification(NotificationKind::Error).is_some());
    }

    #[test]
    fn back_returns_to_browsing() {
        let mut app = opened("/tmp/notes.txt");
        app.update(AppEvent::BackRequested);
        assert_eq!(app.state(), AppState::Browsing);
        assert_eq!(app.command(), Command::Pending);
    }

    #[test]
    fn encrypt_dispatches_once() {
        let mut app = opened("/tmp/notes.txt");
        let effects = app.update(AppEvent::EncryptRequested);
        assert!(matches!(
            effects.as_slice(),
            [Effect::Encrypt { path, .. }] if path == Path::new("/tmp/notes.txt")
        ));
        assert_eq!(app.command(), Command::Encrypting);
        assert!(app.is_busy());

        assert!(app.update(AppEvent::EncryptRequested).is_empty());
        assert!(app.update(AppEvent::DecryptRequested).is_empty());
        assert_eq!(app.command(), Command::Encrypting);
    }

    #[test]
    fn requests_in_browsing_are_ignored() {
        let mut app = controller();
        app.update(AppEvent::KeyLoaded(key()));
        assert!(app.update(AppEvent::EncryptRequested).is_empty());
        assert!(app.update(AppEvent::DecryptRequested).is_empty());
        assert!(app.notification(NotificationKind::Error).is_none());
    }

    #[test]
    fn request_without_key_surfaces_an_error() {
        let mut app = controller();
        app.update(AppEvent::FileSelected(PathBuf::from("/tmp/notes.txt")));
        let effects = app.update(AppEvent::DecryptRequested);
        assert!(matches!(
            effects.as_slice(),
            [Effect::ScheduleClear { kind: NotificationKind::Error, .. }]
        ));
        assert_eq!(
            app.notification(NotificationKind::Error).unwrap().text,
            EncrypterError::KeyNotLoaded.to_string()
        );
        assert_eq!(app.command(), Command::Pending);
        assert!(!app.is_busy());
    }

    #[test]
    fn success_returns_to_browsing_with_info() {
        let mut app = opened("/tmp/notes.txt");
        let op = op_of(&app.update(AppEvent::EncryptRequested));

        let effects = app.update(AppEvent::OperationSucceeded {
            op,
            path: PathBuf::from("/tmp/notes.txt"),
            outcome: Outcome::Encrypted,
        });
        assert_eq!(app.state(), AppState::Browsing);
        assert_eq!(app.command(), Command::Done);
        assert!(!app.is_busy());
        let info = app.notification(NotificationKind::Info).unwrap();
        assert_eq!(info.text, Outcome::Encrypted.message());
        assert!(matches!(
            effects.as_slice(),
            [Effect::ScheduleClear { kind: NotificationKind::Info, id, .. }] if *id == info.id
        ));
    }

    #[test]
    fn late_success_for_a_closed_file_only_notifies() {
        let mut app = opened("/tmp/a.txt");
        let op = op_of(&app.update(AppEvent::EncryptRequested));
        app.update(AppEvent::BackRequested);
        app.update(AppEvent::FileSelected(PathBuf::from("/tmp/b.txt")));

        app.update(AppEvent::OperationSucceeded {
            op,
            path: PathBuf::from("/tmp/a.txt"),
            outcome: Outcome::Encrypted,
        });
        assert_eq!(app.state(), AppState::FileOpened);
        assert_eq!(app.file_path(), Some(Path::new("/tmp/b.txt")));
        assert!(app.notification(NotificationKind::Info).is_some());
        assert!(!app.is_busy());
    }

    #[test]
    fn failure_keeps_state_and_frees_the_slot() {
        let mut app = opened("/tmp/notes.txt");
        let op = op_of(&app.update(AppEvent::DecryptRequested));

        let effects = app.update(AppEvent::OperationFailed {
            op: Some(op),
            error: EncrypterError::Authentication,
        });
        assert_eq!(app.state(), AppState::FileOpened);
        assert_eq!(app.command(), Command::Pending);
        assert!(!app.is_busy());
        assert_eq!(
            app.notification(NotificationKind::Error).unwrap().text,
            EncrypterError::Authentication.to_string()
        );
        assert_eq!(effects.len(), 1);

        op_of(&app.update(AppEvent::DecryptRequested));
    }

    #[test]
    fn stale_clear_does_not_erase_newer_notification() {
        let mut app = controller();
        let first = match app.update(AppEvent::FileRejected(PathBuf::from("a.png"))).as_slice() {
            [Effect::ScheduleClear { id, .. }] => *id,
            other => panic!("unexpected effects {other:?}"),
        };
        app.update(AppEvent::FileRejected(PathBuf::from("b.png")));

        app.update(AppEvent::NotificationExpired {
            kind: NotificationKind::Error,
            id: first,
        });
        assert_eq!(
            app.notification(NotificationKind::Error).unwrap().text,
            "b.png is not valid."
        );
    }

    #[test]
    fn help_and_quit() {
        let mut app = controller();
        app.update(AppEvent::HelpToggled);
        assert!(app.show_help());
        app.update(AppEvent::HelpToggled);
        assert!(!app.show_help());
        app.update(AppEvent::QuitRequested);
        assert!(app.should_quit());
    }
}
