//! Runs controller [`Effect`]s as background tasks.
//!
//! Tasks never touch controller state. Each one reports back by sending an
//! [`AppEvent`] on the loop's channel.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::event::{AppEvent, Effect, OperationId};
use crate::file::{decrypt_file, encrypt_file};
use crate::keystore::load_or_create_key;
use crate::notify::NotificationTimer;
use crate::types::{EncrypterError, Key, Outcome};

/// Helper function to send events with proper error handling
///
/// If the send fails, it logs the error. This can happen if the receiver has been dropped,
/// which typically occurs when the terminal loop has already exited.
fn send_event(sender: &mpsc::UnboundedSender<AppEvent>, event: AppEvent) {
    if let Err(e) = sender.send(event) {
        warn!("failed to deliver {:?}: event loop is gone", e.0);
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Clone)]
pub struct Operations {
    events: mpsc::UnboundedSender<AppEvent>,
    timer: NotificationTimer,
}

impl Operations {
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let timer = NotificationTimer::new(events.clone());
        Self { events, timer }
    }

    /// Spawn the task for `effect`. Must be called from within a tokio runtime.
    pub fn run(&self, effect: Effect) {
        debug!("running {effect:?}");
        match effect {
            Effect::LoadKey { path } => self.load_key(path),
            Effect::LoadPreview { path, limit } => self.load_preview(path, limit),
            Effect::Encrypt { op, key, path } => self.transform(op, key, path, Direction::Encrypt),
            Effect::Decrypt { op, key, path } => self.transform(op, key, path, Direction::Decrypt),
            Effect::ScheduleClear { kind, id, after } => {
                self.timer.schedule_clear(kind, id, after);
            }
        }
    }

    pub fn run_all(&self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            self.run(effect);
        }
    }

    fn load_key(&self, path: PathBuf) {
        let sender = self.events.clone();
        tokio::task::spawn_blocking(move || {
            let event = match load_or_create_key(&path) {
                Ok(key) => AppEvent::KeyLoaded(key),
                Err(error) => AppEvent::OperationFailed { op: None, error },
            };
            send_event(&sender, event);
        });
    }

    fn load_preview(&self, path: PathBuf, limit: usize) {
        let sender = self.events.clone();
        tokio::task::spawn_blocking(move || {
            let event = match read_preview(&path, limit) {
                Ok(text) => AppEvent::PreviewLoaded { path, text },
                Err(error) => AppEvent::OperationFailed { op: None, error },
            };
            send_event(&sender, event);
        });
    }

    fn transform(&self, op: OperationId, key: Arc<Key>, path: PathBuf, direction: Direction) {
        let sender = self.events.clone();
        tokio::task::spawn_blocking(move || {
            let result: Result<Outcome, EncrypterError> = match direction {
                Direction::Encrypt => encrypt_file(&key, &path),
                Direction::Decrypt => decrypt_file(&key, &path),
            };
            let event = match result {
                Ok(outcome) => AppEvent::OperationSucceeded { op, path, outcome },
                Err(error) => AppEvent::OperationFailed {
                    op: Some(op),
                    error,
                },
            };
            send_event(&sender, event);
        });
    }
}

/// Read at most `limit` bytes of `path` as lossy UTF-8.
pub fn read_preview(path: &Path, limit: usize) -> Result<String, EncrypterError> {
    let mut buf = Vec::new();
    File::open(path)?
        .take(limit as u64)
        .read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
