//! # Notifications Module
//!
//! Best-effort email notifications. Request paths build a notification from
//! data gathered inside their transaction and enqueue it after commit; a single
//! background worker drains the bounded queue and hands each message to the
//! configured [`MailTransport`].
//!
//! - `kinds` - the concrete notifications and their HTML bodies
//! - `service` - bounded queue, enqueue deadline and the worker
//! - `transport` - SES and logging transports

pub mod kinds;
pub mod service;
pub mod transport;


use std::fmt;
use thiserror::Error;

use crate::auth::models::{NotificationPreferences, User};

pub use kinds::{
    ApplicationReceived, ApplicationSubmitted, ApplicationUpdated, ApplicationWithdrawn,
    BusinessRequested,
};
pub use service::{NotificationService, NotificationWorker, QUEUE_CAPACITY};
pub use transport::{LogTransport, MailTransport, SesTransport};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification queue is full")]
    QueueFull,

    #[error("notification worker has stopped")]
    Closed,

    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Who a notification goes to, captured when the notification is built
#[derive(Debug, Clone)]
pub struct Recipient {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub preferences: NotificationPreferences,
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            preferences: user.notifications,
        }
    }
}

/// A self-contained message. Everything needed to render it is captured at
/// construction time; the worker never goes back to storage.
pub trait Notification: fmt::Debug + Send + Sync {
    /// Short stable name, used in logs
    fn kind(&self) -> &'static str;

    fn recipient(&self) -> &Recipient;

    fn subject(&self) -> String;

    fn render_body(&self, frontend_url: &str) -> String;

    /// Preference gate, checked by the worker right before delivery
    fn should_notify(&self) -> bool;
}
