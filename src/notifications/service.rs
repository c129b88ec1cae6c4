// src/notifications/service.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::transport::{MailTransport, OutgoingMail};
use super::{Notification, NotificationError};
use crate::common::safe_email_log;

pub const QUEUE_CAPACITY: usize = 8;

/// How long a request path waits for queue space before giving up
pub const ENQUEUE_TIMEOUT: Duration = Duration::from_millis(100);

pub type QueuedNotification = Box<dyn Notification>;

/// Producer side of the notification queue. Cheap to clone.
#[derive(Clone)]
pub struct NotificationService {
    sender: mpsc::Sender<QueuedNotification>,
}

impl NotificationService {
    /// Creates the queue. The receiving half goes to exactly one
    /// [`NotificationWorker`].
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<QueuedNotification>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueue, waiting at most `timeout` for space
    pub async fn enqueue(
        &self,
        notification: QueuedNotification,
        timeout: Duration,
    ) -> Result<(), NotificationError> {
        self.sender
            .send_timeout(notification, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => NotificationError::QueueFull,
                SendTimeoutError::Closed(_) => NotificationError::Closed,
            })
    }

    /// Fire-and-forget enqueue for request paths. Failures are logged and
    /// dropped; the caller's operation has already committed.
    pub async fn notify<N>(&self, notification: N)
    where
        N: Notification + 'static,
    {
        let kind = notification.kind();
        let user_id = notification.recipient().user_id.clone();

        match self.enqueue(Box::new(notification), ENQUEUE_TIMEOUT).await {
            Ok(()) => debug!(kind, user_id = %user_id, "Notification enqueued"),
            Err(e) => warn!(kind, user_id = %user_id, error = %e, "Dropping notification"),
        }
    }

    pub async fn notify_all<N>(&self, notifications: Vec<N>)
    where
        N: Notification + 'static,
    {
        for notification in notifications {
            self.notify(notification).await;
        }
    }
}

/// The single consumer of the notification queue
pub struct NotificationWorker {
    receiver: mpsc::Receiver<QueuedNotification>,
    transport: Arc<dyn MailTransport>,
    frontend_url: String,
}

impl NotificationWorker {
    pub fn new(
        receiver: mpsc::Receiver<QueuedNotification>,
        transport: Arc<dyn MailTransport>,
        frontend_url: String,
    ) -> Self {
        Self {
            receiver,
            transport,
            frontend_url,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drains the queue serially until every sender is dropped
    pub async fn run(mut self) {
        info!("Notification worker started");
        while let Some(notification) = self.receiver.recv().await {
            self.deliver(notification.as_ref()).await;
        }
        info!("Notification worker stopped");
    }

    async fn deliver(&self, notification: &dyn Notification) {
        let recipient = notification.recipient();

        if !notification.should_notify() {
            debug!(
                kind = notification.kind(),
                user_id = %recipient.user_id,
                "Recipient opted out of notification"
            );
            return;
        }

        if recipient.email.is_empty() {
            warn!(
                kind = notification.kind(),
                user_id = %recipient.user_id,
                "Recipient has no email address"
            );
            return;
        }

        let mail = OutgoingMail {
            to: recipient.email.clone(),
            subject: notification.subject(),
            html_body: notification.render_body(&self.frontend_url),
        };

        match self.transport.send(&mail).await {
            Ok(()) => debug!(
                kind = notification.kind(),
                to = %safe_email_log(&mail.to),
                "Notification delivered"
            ),
            Err(e) => warn!(
                kind = notification.kind(),
                to = %safe_email_log(&mail.to),
                error = %e,
                "Notification delivery failed"
            ),
        }
    }
}
