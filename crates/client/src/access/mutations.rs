//! Mutation bindings.
//!
//! A mutation runs once (no automatic retry). On success its invalidation
//! set is applied to the query cache and a success notification is sent; on
//! failure the cache is left alone and an error notification is sent.
//! Invalid local input is rejected before any backend call and returned
//! without a notification.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use fairway_core::{EventId, Principal, ProfileDraft, Timestamp, UserProfile};
use tracing::{debug, instrument};

use super::DataAccess;
use crate::backend::{Backend, BackendError};
use crate::cache::QueryKey;
use crate::error::MutationError;

/// Every mutation the client can issue.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum MutationKind {
    SaveCallerProfile,
    SendMessage,
    MarkMessageAsRead,
    CreateEvent,
    RsvpToEvent,
    CancelRsvp,
    AddCourse,
}

impl MutationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SaveCallerProfile => "saveCallerUserProfile",
            Self::SendMessage => "sendMessage",
            Self::MarkMessageAsRead => "markMessageAsRead",
            Self::CreateEvent => "createEvent",
            Self::RsvpToEvent => "rsvpToEvent",
            Self::CancelRsvp => "cancelRsvp",
            Self::AddCourse => "addCourse",
        }
    }

    /// Notification shown after success, if any.
    #[must_use]
    pub const fn success_message(self) -> Option<&'static str> {
        match self {
            Self::SaveCallerProfile => Some("Profile saved successfully!"),
            Self::CreateEvent => Some("Event created successfully!"),
            Self::RsvpToEvent => Some("RSVP confirmed!"),
            Self::CancelRsvp => Some("RSVP cancelled"),
            Self::AddCourse => Some("Course added successfully!"),
            Self::SendMessage | Self::MarkMessageAsRead => None,
        }
    }

    /// Notification shown after failure.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::SaveCallerProfile => "Failed to save profile",
            Self::SendMessage => "Failed to send message",
            Self::MarkMessageAsRead => "Failed to mark message as read",
            Self::CreateEvent => "Failed to create event",
            Self::RsvpToEvent | Self::CancelRsvp => "Failed to update RSVP",
            Self::AddCourse => "Failed to add course",
        }
    }

    /// Keys marked stale after the mutation succeeds.
    ///
    /// `counterparty` is the other side of the conversation for message
    /// mutations and is ignored otherwise.
    #[must_use]
    pub fn invalidation_set(self, counterparty: Option<&Principal>) -> Vec<QueryKey> {
        match self {
            Self::SaveCallerProfile => vec![
                QueryKey::caller_profile(),
                QueryKey::course_directory(),
                QueryKey::all_courses_with_members(),
            ],
            Self::SendMessage | Self::MarkMessageAsRead => {
                counterparty.map(QueryKey::messages).into_iter().collect()
            }
            Self::CreateEvent | Self::RsvpToEvent | Self::CancelRsvp => vec![QueryKey::events()],
            Self::AddCourse => vec![QueryKey::course_directory()],
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a mutation is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl DataAccess {
    /// Latest status of `kind`.
    pub async fn mutation_status(&self, kind: MutationKind) -> MutationStatus {
        self.mutations
            .read()
            .await
            .get(&kind)
            .copied()
            .unwrap_or_default()
    }

    async fn set_status(&self, kind: MutationKind, status: MutationStatus) {
        self.mutations.write().await.insert(kind, status);
    }

    async fn mutate<F, Fut>(
        &self,
        kind: MutationKind,
        invalidates: Vec<QueryKey>,
        call: F,
    ) -> Result<(), MutationError>
    where
        F: FnOnce(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = Result<(), BackendError>>,
    {
        let Some(backend) = self.connection.backend() else {
            return Err(MutationError::NotConnected);
        };

        self.set_status(kind, MutationStatus::Pending).await;

        match call(backend).await {
            Ok(()) => {
                for key in &invalidates {
                    self.cache.invalidate(key).await;
                }
                self.set_status(kind, MutationStatus::Succeeded).await;
                debug!(%kind, invalidated = invalidates.len(), "Mutation succeeded");
                if let Some(message) = kind.success_message() {
                    self.notifier.success(message);
                }
                Ok(())
            }
            Err(e) => {
                self.set_status(kind, MutationStatus::Failed).await;
                self.notifier.error(kind.failure_message(), &e);
                Err(MutationError::Backend { kind, source: e })
            }
        }
    }

    /// Validate and save the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::Invalid`] without calling the backend if the
    /// draft fails validation.
    #[instrument(skip_all)]
    pub async fn save_caller_profile(
        &self,
        draft: ProfileDraft,
    ) -> Result<UserProfile, MutationError> {
        let profile = draft.validate()?;
        let keys = MutationKind::SaveCallerProfile.invalidation_set(None);
        let saved = profile.clone();
        self.mutate(MutationKind::SaveCallerProfile, keys, |backend| async move {
            backend.save_caller_user_profile(&saved).await
        })
        .await?;
        Ok(profile)
    }

    /// Send `content` to `recipient`.
    ///
    /// Blank messages are rejected locally. Otherwise the text is sent as
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::EmptyField`] for blank content.
    #[instrument(skip(self, content), fields(recipient = %recipient))]
    pub async fn send_message(
        &self,
        recipient: &Principal,
        content: &str,
    ) -> Result<(), MutationError> {
        if content.trim().is_empty() {
            return Err(MutationError::EmptyField("message"));
        }
        let keys = MutationKind::SendMessage.invalidation_set(Some(recipient));
        let recipient = recipient.clone();
        let content = content.to_owned();
        self.mutate(MutationKind::SendMessage, keys, |backend| async move {
            backend.send_message(&recipient, &content).await
        })
        .await
    }

    /// Mark the message `with_user` sent at `timestamp` as read.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected or the backend call fails.
    #[instrument(skip(self), fields(with_user = %with_user))]
    pub async fn mark_message_as_read(
        &self,
        with_user: &Principal,
        timestamp: Timestamp,
    ) -> Result<(), MutationError> {
        let keys = MutationKind::MarkMessageAsRead.invalidation_set(Some(with_user));
        let with_user = with_user.clone();
        self.mutate(MutationKind::MarkMessageAsRead, keys, |backend| async move {
            backend.mark_message_as_read(&with_user, timestamp).await
        })
        .await
    }

    /// Create an event at `course_name`.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::EmptyField`] if either field is blank.
    #[instrument(skip(self, description))]
    pub async fn create_event(
        &self,
        course_name: &str,
        description: &str,
    ) -> Result<(), MutationError> {
        let course_name = course_name.trim();
        let description = description.trim();
        if course_name.is_empty() {
            return Err(MutationError::EmptyField("course name"));
        }
        if description.is_empty() {
            return Err(MutationError::EmptyField("description"));
        }

        let keys = MutationKind::CreateEvent.invalidation_set(None);
        let course_name = course_name.to_owned();
        let description = description.to_owned();
        self.mutate(MutationKind::CreateEvent, keys, |backend| async move {
            backend.create_event(&course_name, &description).await
        })
        .await
    }

    /// RSVP the caller to an event.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected or the backend call fails.
    #[instrument(skip(self))]
    pub async fn rsvp_to_event(&self, event_id: EventId) -> Result<(), MutationError> {
        let keys = MutationKind::RsvpToEvent.invalidation_set(None);
        self.mutate(MutationKind::RsvpToEvent, keys, |backend| async move {
            backend.rsvp_to_event(event_id).await
        })
        .await
    }

    /// Withdraw the caller's RSVP.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected or the backend call fails.
    #[instrument(skip(self))]
    pub async fn cancel_rsvp(&self, event_id: EventId) -> Result<(), MutationError> {
        let keys = MutationKind::CancelRsvp.invalidation_set(None);
        self.mutate(MutationKind::CancelRsvp, keys, |backend| async move {
            backend.cancel_rsvp(event_id).await
        })
        .await
    }

    /// Add a course to the directory. Admin only on the backend side.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::EmptyField`] for a blank name and
    /// [`MutationError::InvalidWebsite`] if `website` is not an absolute URL.
    #[instrument(skip(self))]
    pub async fn add_course(
        &self,
        name: &str,
        website: &str,
        is_local: bool,
    ) -> Result<(), MutationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MutationError::EmptyField("course name"));
        }
        let website = url::Url::parse(website.trim())
            .map_err(|e| MutationError::InvalidWebsite(format!("{website}: {e}")))?;

        let keys = MutationKind::AddCourse.invalidation_set(None);
        let name = name.to_owned();
        self.mutate(MutationKind::AddCourse, keys, |backend| async move {
            backend.add_course(&name, website.as_str(), is_local).await
        })
        .await
    }
}
