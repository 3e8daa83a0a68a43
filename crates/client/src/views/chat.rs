use std::time::Duration;

use fairway_core::{Message, Principal};
use tracing::debug;

use crate::access::DataAccess;
use crate::error::MutationError;
use crate::poll::ThreadWatch;

/// An open conversation.
///
/// Polls the thread for as long as the view is alive.
#[derive(Debug)]
pub struct ChatView {
    access: DataAccess,
    me: Principal,
    watch: ThreadWatch,
}

impl ChatView {
    /// Open the conversation between `me` and `with_user`.
    #[must_use]
    pub fn open(access: &DataAccess, me: Principal, with_user: Principal, every: Duration) -> Self {
        debug!(%with_user, "Opening chat");
        let watch = access.watch_messages(with_user, every);
        Self {
            access: access.clone(),
            me,
            watch,
        }
    }

    #[must_use]
    pub const fn with_user(&self) -> &Principal {
        self.watch.with_user()
    }

    /// The thread as last polled, empty before the first poll.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.watch.latest().unwrap_or_default()
    }

    /// Messages from the other side not yet marked read.
    #[must_use]
    pub fn unread(&self) -> Vec<Message> {
        self.messages()
            .into_iter()
            .filter(|m| !m.read && !m.is_from(&self.me))
            .collect()
    }

    /// Wait for the next poll result.
    pub async fn refreshed(&mut self) -> Option<Vec<Message>> {
        self.watch.changed().await
    }

    /// Send a message. Blank text is rejected locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank or the send fails.
    pub async fn send(&self, text: &str) -> Result<(), MutationError> {
        self.access.send_message(self.with_user(), text).await
    }

    /// Mark every unread incoming message as read. Returns how many were
    /// marked.
    ///
    /// # Errors
    ///
    /// Stops at the first failure.
    pub async fn mark_all_read(&self) -> Result<usize, MutationError> {
        let unread = self.unread();
        for message in &unread {
            self.access
                .mark_message_as_read(self.with_user(), message.timestamp)
                .await?;
        }
        Ok(unread.len())
    }

    /// Stop polling and close the view.
    pub fn close(self) {
        self.watch.cancel();
    }
}
