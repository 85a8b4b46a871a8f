//! Messages flowing into the control loop and the effects it asks for.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::notify::{NotificationId, NotificationKind};
use crate::types::{EncrypterError, Key, Outcome};

/// Identifies one dispatched encrypt/decrypt task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(pub(crate) u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// Everything the controller reacts to.
#[derive(Debug)]
pub enum AppEvent {
    /// The browser picked a file with an allowed extension.
    FileSelected(PathBuf),
    /// The browser picked a file it does not allow.
    FileRejected(PathBuf),
    KeyLoaded(Key),
    PreviewLoaded {
        path: PathBuf,
        text: String,
    },
    EncryptRequested,
    DecryptRequested,
    BackRequested,
    HelpToggled,
    QuitRequested,
    OperationSucceeded {
        op: OperationId,
        path: PathBuf,
        outcome: Outcome,
    },
    /// `op` is `None` for failures outside an encrypt/decrypt task (key load, preview).
    OperationFailed {
        op: Option<OperationId>,
        error: EncrypterError,
    },
    NotificationExpired {
        kind: NotificationKind,
        id: NotificationId,
    },
}

/// Side effects requested by the controller, executed by [`Operations`](crate::Operations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadKey {
        path: PathBuf,
    },
    LoadPreview {
        path: PathBuf,
        limit: usize,
    },
    Encrypt {
        op: OperationId,
        key: Arc<Key>,
        path: PathBuf,
    },
    Decrypt {
        op: OperationId,
        key: Arc<Key>,
        path: PathBuf,
    },
    ScheduleClear {
        kind: NotificationKind,
        id: NotificationId,
        after: Duration,
    },
}
