//! Transient user-facing notifications.
//!
//! Mutations report their outcome here ("RSVP confirmed!", "Failed to send
//! message"). Front ends subscribe and render them however they like; every
//! notification is also logged.

use tokio::sync::broadcast;
use tracing::{error, info};

/// Buffered notifications per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Broadcasts notifications to every subscriber.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Receive notifications sent from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "Notification");
        self.publish(NotificationLevel::Success, message);
    }

    /// Report a failure. `detail` goes to the log only.
    pub fn error(&self, message: impl Into<String>, detail: &dyn std::error::Error) {
        let message = message.into();
        error!(%message, error = %detail, "Notification");
        self.publish(NotificationLevel::Error, message);
    }

    fn publish(&self, level: NotificationLevel, message: String) {
        // No subscribers is fine
        let _ = self.sender.send(Notification { level, message });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::BackendError;

    #[tokio::test]
    async fn test_subscribers_receive_notifications() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.success("RSVP confirmed!");
        notifier.error(
            "Failed to send message",
            &BackendError::Rejected("Unauthorized".to_string()),
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.level, NotificationLevel::Success);
        assert_eq!(first.message, "RSVP confirmed!");

        let second = rx.recv().await.unwrap();
        assert_eq!(second.level, NotificationLevel::Error);
        assert_eq!(second.message, "Failed to send message");
    }

    #[test]
    fn test_send_without_subscribers() {
        Notifier::new().success("Profile saved");
    }
}
