//! Data access layer.
//!
//! Binds each backend read to a cache key and an enablement predicate, and
//! each write to an invalidation set. Views go through [`DataAccess`] and
//! never call the backend directly.
//!
//! | Query | Key | Enabled when |
//! |---|---|---|
//! | [`caller_profile`](DataAccess::caller_profile) | `currentUserProfile` | connected |
//! | [`search_matches`](DataAccess::search_matches) | `matches` | connected |
//! | [`user_profile`](DataAccess::user_profile) | `userProfile/<principal>` | connected, principal given |
//! | [`course_directory`](DataAccess::course_directory) | `courseDirectory` | connected |
//! | [`course_with_members`](DataAccess::course_with_members) | `courseWithMembers/<name>` | connected, name non-empty |
//! | [`messages`](DataAccess::messages) | `messages/<principal>` | connected, counterparty given |
//! | [`all_events`](DataAccess::all_events) | `events` | connected |
//! | [`sponsors`](DataAccess::sponsors) | `sponsors` | connected |
//! | [`is_caller_admin`](DataAccess::is_caller_admin) | `isCallerAdmin` | connected |

mod mutations;

pub use mutations::{MutationKind, MutationStatus};

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use fairway_core::{CourseDetails, CourseWithMembers, EventListing, Message, Principal, UserProfile};
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::{Backend, BackendError};
use crate::cache::{Cached, QueryCache, QueryKey};
use crate::connection::Connection;
use crate::error::QueryError;
use crate::notify::Notifier;

/// Outcome of an enabled-or-not query.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// Preconditions not met; nothing was fetched.
    Disabled,
    Ready(T),
}

impl<T> Fetched<T> {
    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Disabled => None,
        }
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Ready(value) => Fetched::Ready(f(value)),
            Self::Disabled => Fetched::Disabled,
        }
    }
}

/// Query and mutation bindings over a shared cache and connection.
///
/// Cheap to clone.
#[derive(Debug, Clone)]
pub struct DataAccess {
    connection: Connection,
    cache: QueryCache,
    notifier: Notifier,
    mutations: Arc<RwLock<HashMap<MutationKind, MutationStatus>>>,
}

impl DataAccess {
    #[must_use]
    pub fn new(connection: Connection, cache: QueryCache, notifier: Notifier) -> Self {
        Self {
            connection,
            cache,
            notifier,
            mutations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        force: bool,
        call: F,
    ) -> Result<Fetched<T>, QueryError>
    where
        T: Cached,
        F: FnOnce(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let Some(backend) = self.connection.backend() else {
            debug!(%key, "Query disabled: not connected");
            return Ok(Fetched::Disabled);
        };

        let fetched = if force {
            self.cache.refetch(key, || call(backend)).await?
        } else {
            self.cache.fetch(key, || call(backend)).await?
        };
        Ok(Fetched::Ready(fetched))
    }

    /// The caller's own profile; `None` inside `Ready` before the first save.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or is backing off.
    pub async fn caller_profile(&self) -> Result<Fetched<Option<UserProfile>>, QueryError> {
        self.query(QueryKey::caller_profile(), false, |backend| async move {
            backend.get_caller_user_profile().await
        })
        .await
    }

    /// Candidate profiles for discovery.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or is backing off.
    pub async fn search_matches(&self) -> Result<Fetched<Vec<UserProfile>>, QueryError> {
        self.query(QueryKey::matches(), false, |backend| async move {
            backend.search_matches().await
        })
        .await
    }

    /// Another user's profile. Disabled without a principal.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or is backing off.
    pub async fn user_profile(
        &self,
        user: Option<&Principal>,
    ) -> Result<Fetched<Option<UserProfile>>, QueryError> {
        let Some(user) = user.cloned() else {
            return Ok(Fetched::Disabled);
        };
        self.query(QueryKey::user_profile(&user), false, |backend| async move {
            backend.get_user_profile(&user).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails or is backing off.
    pub async fn course_directory(
        &self,
    ) -> Result<Fetched<Vec<(String, CourseDetails)>>, QueryError> {
        self.query(QueryKey::course_directory(), false, |backend| async move {
            backend.get_course_directory().await
        })
        .await
    }

    /// A course and its members. Disabled without a non-empty name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or is backing off.
    pub async fn course_with_members(
        &self,
        course_name: Option<&str>,
    ) -> Result<Fetched<Option<CourseWithMembers>>, QueryError> {
        let Some(name) = course_name.filter(|n| !n.is_empty()).map(str::to_owned) else {
            return Ok(Fetched::Disabled);
        };
        self.query(
            QueryKey::course_with_members(&name),
            false,
            |backend| async move { backend.get_course_with_members(&name).await },
        )
        .await
    }

    /// The conversation with `with_user`. Disabled without a counterparty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or is backing off.
    pub async fn messages(
        &self,
        with_user: Option<&Principal>,
    ) -> Result<Fetched<Vec<Message>>, QueryError> {
        self.load_messages(with_user, false).await
    }

    /// Fetch the conversation from the backend regardless of cache state.
    pub(crate) async fn poll_messages(
        &self,
        with_user: &Principal,
    ) -> Result<Fetched<Vec<Message>>, QueryError> {
        self.load_messages(Some(with_user), true).await
    }

    async fn load_messages(
        &self,
        with_user: Option<&Principal>,
        force: bool,
    ) -> Result<Fetched<Vec<Message>>, QueryError> {
        let Some(with_user) = with_user.cloned() else {
            return Ok(Fetched::Disabled);
        };
        self.query(QueryKey::messages(&with_user), force, |backend| async move {
            backend.get_messages(&with_user).await
        })
        .await
    }

    /// Every event with its positional id and attendees.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or is backing off.
    pub async fn all_events(&self) -> Result<Fetched<Vec<EventListing>>, QueryError> {
        self.query(QueryKey::events(), false, |backend| async move {
            backend
                .get_all_events()
                .await
                .map(EventListing::from_backend)
        })
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails or is backing off.
    pub async fn sponsors(&self) -> Result<Fetched<Vec<String>>, QueryError> {
        self.query(QueryKey::sponsors(), false, |backend| async move {
            backend.get_sponsors().await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails or is backing off.
    pub async fn is_caller_admin(&self) -> Result<Fetched<bool>, QueryError> {
        self.query(QueryKey::is_caller_admin(), false, |backend| async move {
            backend.is_caller_admin().await
        })
        .await
    }
}
