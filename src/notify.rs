//! Transient notifications and the timer that expires them.
//!
//! Every notification gets a fresh [`NotificationId`]. The clear event sent by the
//! timer names that id, so a timer that outlives its notification cannot erase a
//! newer one of the same kind.

use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub text: String,
    pub expires_at: Instant,
}

impl Notification {
    /// Time left before the timer clears this notification, zero once due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

/// One slot per [`NotificationKind`].
#[derive(Debug, Default)]
pub struct NotificationBoard {
    info: Option<Notification>,
    error: Option<Notification>,
    next_id: u64,
}

impl NotificationBoard {
    /// Replace the current notification of `kind` and return the new one's id.
    pub fn post(
        &mut self,
        kind: NotificationKind,
        text: impl Into<String>,
        ttl: Duration,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        *self.slot_mut(kind) = Some(Notification {
            id,
            kind,
            text: text.into(),
            expires_at: Instant::now() + ttl,
        });
        id
    }

    /// Clear the notification of `kind` if it is still the one with `id`.
    ///
    /// Returns `false` for stale clears.
    pub fn expire(&mut self, kind: NotificationKind, id: NotificationId) -> bool {
        let slot = self.slot_mut(kind);
        if slot.as_ref().is_some_and(|n| n.id == id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self, kind: NotificationKind) -> Option<&Notification> {
        match kind {
            NotificationKind::Info => self.info.as_ref(),
            NotificationKind::Error => self.error.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: NotificationKind) -> &mut Option<Notification> {
        match kind {
            NotificationKind::Info => &mut self.info,
            NotificationKind::Error => &mut self.error,
        }
    }
}

/// Sends `NotificationExpired` events back into the control loop after a delay.
#[derive(Debug, Clone)]
pub struct NotificationTimer {
    events: mpsc::UnboundedSender<AppEvent>,
}

impl NotificationTimer {
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { events }
    }

    /// Must be called from within a tokio runtime. There is no cancellation; the
    /// controller discards clears that arrive for a replaced notification.
    pub fn schedule_clear(
        &self,
        kind: NotificationKind,
        id: NotificationId,
        after: Duration,
    ) -> JoinHandle<()> {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // The loop may already be gone on shutdown.
            let _ = events.send(AppEvent::NotificationExpired { kind, id });
        })
    }
}
