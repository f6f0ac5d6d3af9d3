//! User-facing notifications for status changes.
//!
//! The board reports every committed status change to its
//! [`StatusObserver`]s. [`Notification::for_change`] turns a change into the
//! message shown to the idea's author, and [`Inbox`] keeps those messages
//! with read/unread tracking.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::Status;

/// A committed status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    /// The idea that moved.
    pub idea_id: Uuid,
    /// Title of the idea at the time of the change.
    pub title: String,
    /// Author of the idea, the usual recipient of the notification.
    pub author_id: String,
    /// Previous status.
    pub from: Status,
    /// New status.
    pub to: Status,
    /// Comment recorded with the change, if one was supplied.
    pub comment: Option<String>,
}

/// Receives status changes after they have been committed.
pub trait StatusObserver {
    /// Called once per committed change.
    fn status_changed(&mut self, change: &StatusChange);
}

impl<F> StatusObserver for F
where
    F: FnMut(&StatusChange),
{
    fn status_changed(&mut self, change: &StatusChange) {
        self(change);
    }
}

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral progress.
    Info,
    /// Good news.
    Success,
    /// Needs the reader's attention.
    Warning,
}

/// A message for the author of an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Identifier of this notification.
    pub id: Uuid,
    /// The idea the message is about.
    pub idea_id: Uuid,
    /// Recipient.
    pub recipient: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Presentation hint.
    pub severity: Severity,
    /// When the notification was raised.
    pub timestamp: DateTime<Utc>,
    /// Whether the recipient has seen it.
    pub read: bool,
}

impl Notification {
    /// Build the notification for a status change.
    ///
    /// Moving back to [`Status::Open`] produces no notification.
    #[must_use]
    pub fn for_change(change: &StatusChange) -> Option<Self> {
        let title = &change.title;
        let (headline, message, severity) = match change.to {
            Status::Open => return None,
            Status::UnderReview => (
                "Idea en revisión",
                format!("Tu idea \"{title}\" está siendo revisada por el equipo responsable."),
                Severity::Info,
            ),
            Status::CommitteeReview => (
                "Evaluación en Comité",
                format!("Tu idea \"{title}\" está siendo evaluada por el Comité de Dirección."),
                Severity::Info,
            ),
            Status::Approved => (
                "¡Idea aprobada!",
                format!(
                    "¡Felicidades! Tu idea \"{title}\" ha sido aprobada para implementación."
                ),
                Severity::Success,
            ),
            Status::InProgress => (
                "Idea en implementación",
                format!("Tu idea \"{title}\" está siendo implementada actualmente."),
                Severity::Info,
            ),
            Status::Implemented => (
                "¡Idea implementada!",
                format!("¡Excelente! Tu idea \"{title}\" ha sido implementada con éxito."),
                Severity::Success,
            ),
            Status::Rejected => (
                "Idea no aprobada",
                format!(
                    "Tu idea \"{title}\" ha sido evaluada pero no se procederá con su \
                     implementación en este momento."
                ),
                Severity::Warning,
            ),
        };

        Some(Self {
            id: Uuid::new_v4(),
            idea_id: change.idea_id,
            recipient: change.author_id.clone(),
            title: headline.to_string(),
            message,
            severity,
            timestamp: Utc::now(),
            read: false,
        })
    }
}

/// Notifications collected from status changes, newest first.
#[derive(Debug, Default, Clone)]
pub struct Inbox {
    notifications: Vec<Notification>,
}

impl Inbox {
    /// An empty inbox.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            notifications: Vec::new(),
        }
    }

    /// Add a notification at the front.
    pub fn push(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
    }

    /// All notifications, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Notifications addressed to one recipient, newest first.
    pub fn for_recipient<'a>(
        &'a self,
        recipient: &'a str,
    ) -> impl Iterator<Item = &'a Notification> + 'a {
        self.notifications
            .iter()
            .filter(move |n| n.recipient == recipient)
    }

    /// Number of notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Whether the inbox is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Number of notifications not yet read.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Mark one notification as read.
    ///
    /// Returns `false` if no such notification exists.
    pub fn mark_read(&mut self, id: Uuid) -> bool {
        self.notifications
            .iter_mut()
            .find(|n| n.id == id)
            .map(|n| n.read = true)
            .is_some()
    }

    /// Mark every notification as read.
    pub fn mark_all_read(&mut self) {
        for notification in &mut self.notifications {
            notification.read = true;
        }
    }

    /// Remove a notification, returning it if it existed.
    pub fn delete(&mut self, id: Uuid) -> Option<Notification> {
        let index = self.notifications.iter().position(|n| n.id == id)?;
        Some(self.notifications.remove(index))
    }
}

impl StatusObserver for Inbox {
    fn status_changed(&mut self, change: &StatusChange) {
        if let Some(notification) = Notification::for_change(change) {
            self.push(notification);
        }
    }
}
