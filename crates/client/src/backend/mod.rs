//! Remote backend actor interface.
//!
//! # Architecture
//!
//! - The backend is the source of truth for profiles, courses, events and
//!   messages; the client only holds cached read copies
//! - [`Backend`] lists every operation the client consumes, so the data
//!   access layer never depends on a transport
//! - [`HttpBackend`] speaks to a deployed backend over HTTP
//! - [`InMemoryBackend`] keeps state in-process for tests and offline demos
//!
//! # Example
//!
//! ```rust,ignore
//! use fairway_client::backend::{Backend, HttpBackend};
//!
//! let backend = HttpBackend::new(&url, None, Duration::from_secs(10))?;
//! let sponsors = backend.get_sponsors().await?;
//! ```

mod http;
mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

use async_trait::async_trait;
use fairway_core::{
    CourseDetails, CourseWithMembers, Event, EventId, Message, Principal, Timestamp, UserProfile,
};
use thiserror::Error;

/// Wire names of the backend operations.
pub mod ops {
    pub const GET_CALLER_USER_PROFILE: &str = "getCallerUserProfile";
    pub const SAVE_CALLER_USER_PROFILE: &str = "saveCallerUserProfile";
    pub const SEARCH_MATCHES: &str = "searchMatches";
    pub const GET_USER_PROFILE: &str = "getUserProfile";
    pub const GET_COURSE_DIRECTORY: &str = "getCourseDirectory";
    pub const GET_COURSE_WITH_MEMBERS: &str = "getCourseWithMembers";
    pub const GET_MESSAGES: &str = "getMessages";
    pub const SEND_MESSAGE: &str = "sendMessage";
    pub const MARK_MESSAGE_AS_READ: &str = "markMessageAsRead";
    pub const GET_ALL_EVENTS: &str = "getAllEvents";
    pub const CREATE_EVENT: &str = "createEvent";
    pub const RSVP_TO_EVENT: &str = "rsvpToEvent";
    pub const CANCEL_RSVP: &str = "cancelRsvp";
    pub const GET_SPONSORS: &str = "getSponsors";
    pub const ADD_COURSE: &str = "addCourse";
    pub const IS_CALLER_ADMIN: &str = "isCallerAdmin";
}

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The backend rejected the call (it trapped or returned an error).
    #[error("Rejected by backend: {0}")]
    Rejected(String),
}

/// Operations exposed by the remote backend actor.
///
/// Calls are made on behalf of the caller identity the implementation was
/// constructed with.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The caller's own profile, `None` before the first save.
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, BackendError>;

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<(), BackendError>;

    /// Every other user's profile. Profiles carry no principal.
    async fn search_matches(&self) -> Result<Vec<UserProfile>, BackendError>;

    async fn get_user_profile(&self, user: &Principal)
    -> Result<Option<UserProfile>, BackendError>;

    async fn get_course_directory(&self) -> Result<Vec<(String, CourseDetails)>, BackendError>;

    async fn get_course_with_members(
        &self,
        course_name: &str,
    ) -> Result<Option<CourseWithMembers>, BackendError>;

    /// The conversation between the caller and `with_user`, oldest first.
    async fn get_messages(&self, with_user: &Principal) -> Result<Vec<Message>, BackendError>;

    async fn send_message(&self, recipient: &Principal, content: &str)
    -> Result<(), BackendError>;

    async fn mark_message_as_read(
        &self,
        with_user: &Principal,
        timestamp: Timestamp,
    ) -> Result<(), BackendError>;

    /// Every event paired with the principals that RSVP'd.
    async fn get_all_events(&self) -> Result<Vec<(Event, Vec<Principal>)>, BackendError>;

    async fn create_event(&self, course_name: &str, description: &str)
    -> Result<(), BackendError>;

    async fn rsvp_to_event(&self, event_id: EventId) -> Result<(), BackendError>;

    async fn cancel_rsvp(&self, event_id: EventId) -> Result<(), BackendError>;

    async fn get_sponsors(&self) -> Result<Vec<String>, BackendError>;

    async fn add_course(&self, name: &str, website: &str, is_local: bool)
    -> Result<(), BackendError>;

    async fn is_caller_admin(&self) -> Result<bool, BackendError>;
}
