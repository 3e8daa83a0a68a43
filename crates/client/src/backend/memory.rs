//! In-process backend used by tests and the offline demo.
//!
//! Several handles can share one state while acting as different callers
//! (see [`InMemoryBackend::as_caller`]), which is how two-sided messaging is
//! exercised without a network.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use fairway_core::{
    CourseDetails, CourseWithMembers, Event, EventId, Message, Principal, Timestamp, UserProfile,
};
use tokio::sync::RwLock;

use super::{Backend, BackendError, ops};

#[derive(Debug, Default)]
struct MemoryState {
    profiles: BTreeMap<Principal, UserProfile>,
    courses: Vec<(String, CourseDetails)>,
    memberships: BTreeMap<String, BTreeSet<Principal>>,
    messages: Vec<Message>,
    events: Vec<(Event, Vec<Principal>)>,
    sponsors: Vec<String>,
    admins: HashSet<Principal>,
    last_timestamp: i64,
}

impl MemoryState {
    /// Wall-clock time, forced strictly increasing so message order is stable.
    fn next_timestamp(&mut self) -> Timestamp {
        let now = Timestamp::now().as_nanos().max(self.last_timestamp + 1);
        self.last_timestamp = now;
        Timestamp::from_nanos(now)
    }
}

#[derive(Debug, Default)]
struct Instrumentation {
    failing: HashSet<&'static str>,
    calls: HashMap<&'static str, usize>,
}

/// Backend whose state lives in memory.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    caller: Principal,
    state: Arc<RwLock<MemoryState>>,
    instrumentation: Arc<RwLock<Instrumentation>>,
}

impl InMemoryBackend {
    /// Create an empty backend acting as `caller`.
    #[must_use]
    pub fn new(caller: Principal) -> Self {
        Self {
            caller,
            state: Arc::new(RwLock::new(MemoryState::default())),
            instrumentation: Arc::new(RwLock::new(Instrumentation::default())),
        }
    }

    /// A handle on the same state acting as another caller.
    #[must_use]
    pub fn as_caller(&self, caller: Principal) -> Self {
        Self {
            caller,
            state: Arc::clone(&self.state),
            instrumentation: Arc::clone(&self.instrumentation),
        }
    }

    /// The principal this handle acts as.
    #[must_use]
    pub const fn caller(&self) -> &Principal {
        &self.caller
    }

    /// Store a profile for any principal.
    pub async fn seed_profile(&self, owner: Principal, profile: UserProfile) {
        self.state.write().await.profiles.insert(owner, profile);
    }

    /// Record `member` as playing `course_name`.
    pub async fn seed_membership(&self, course_name: &str, member: Principal) {
        self.state
            .write()
            .await
            .memberships
            .entry(course_name.to_owned())
            .or_default()
            .insert(member);
    }

    /// Add a sponsor name.
    pub async fn seed_sponsor(&self, name: &str) {
        self.state.write().await.sponsors.push(name.to_owned());
    }

    /// Add an event with an explicit timestamp.
    pub async fn seed_event(&self, event: Event) {
        self.state.write().await.events.push((event, Vec::new()));
    }

    /// Grant admin rights to a principal.
    pub async fn seed_admin(&self, principal: Principal) {
        self.state.write().await.admins.insert(principal);
    }

    /// Make every subsequent call to `operation` fail.
    pub async fn fail_on(&self, operation: &'static str) {
        self.instrumentation.write().await.failing.insert(operation);
    }

    /// Stop injecting failures.
    pub async fn clear_failures(&self) {
        self.instrumentation.write().await.failing.clear();
    }

    /// How many times `operation` has been called, failed calls included.
    pub async fn calls(&self, operation: &str) -> usize {
        self.instrumentation
            .read()
            .await
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    async fn enter(&self, operation: &'static str) -> Result<(), BackendError> {
        let mut instrumentation = self.instrumentation.write().await;
        *instrumentation.calls.entry(operation).or_insert(0) += 1;
        if instrumentation.failing.contains(operation) {
            return Err(BackendError::Rejected(format!("{operation} failed")));
        }
        Ok(())
    }

    fn conversation_between(message: &Message, a: &Principal, b: &Principal) -> bool {
        (&message.sender == a && &message.recipient == b)
            || (&message.sender == b && &message.recipient == a)
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, BackendError> {
        self.enter(ops::GET_CALLER_USER_PROFILE).await?;
        Ok(self.state.read().await.profiles.get(&self.caller).cloned())
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        self.enter(ops::SAVE_CALLER_USER_PROFILE).await?;
        if !profile.location.is_valid() {
            return Err(BackendError::Rejected("invalid coordinates".to_string()));
        }
        self.state
            .write()
            .await
            .profiles
            .insert(self.caller.clone(), profile.clone());
        Ok(())
    }

    async fn search_matches(&self) -> Result<Vec<UserProfile>, BackendError> {
        self.enter(ops::SEARCH_MATCHES).await?;
        let state = self.state.read().await;
        Ok(state
            .profiles
            .iter()
            .filter(|(owner, _)| *owner != &self.caller)
            .map(|(_, profile)| profile.clone())
            .collect())
    }

    async fn get_user_profile(
        &self,
        user: &Principal,
    ) -> Result<Option<UserProfile>, BackendError> {
        self.enter(ops::GET_USER_PROFILE).await?;
        Ok(self.state.read().await.profiles.get(user).cloned())
    }

    async fn get_course_directory(&self) -> Result<Vec<(String, CourseDetails)>, BackendError> {
        self.enter(ops::GET_COURSE_DIRECTORY).await?;
        Ok(self.state.read().await.courses.clone())
    }

    async fn get_course_with_members(
        &self,
        course_name: &str,
    ) -> Result<Option<CourseWithMembers>, BackendError> {
        self.enter(ops::GET_COURSE_WITH_MEMBERS).await?;
        let state = self.state.read().await;
        let Some((_, course)) = state.courses.iter().find(|(name, _)| name == course_name) else {
            return Ok(None);
        };
        let members = state
            .memberships
            .get(course_name)
            .into_iter()
            .flatten()
            .filter_map(|member| state.profiles.get(member).cloned())
            .collect();
        Ok(Some(CourseWithMembers {
            course: course.clone(),
            members,
        }))
    }

    async fn get_messages(&self, with_user: &Principal) -> Result<Vec<Message>, BackendError> {
        self.enter(ops::GET_MESSAGES).await?;
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .filter(|m| Self::conversation_between(m, &self.caller, with_user))
            .cloned()
            .collect())
    }

    async fn send_message(
        &self,
        recipient: &Principal,
        content: &str,
    ) -> Result<(), BackendError> {
        self.enter(ops::SEND_MESSAGE).await?;
        let mut state = self.state.write().await;
        let timestamp = state.next_timestamp();
        state.messages.push(Message {
            sender: self.caller.clone(),
            recipient: recipient.clone(),
            content: content.to_owned(),
            timestamp,
            read: false,
        });
        Ok(())
    }

    async fn mark_message_as_read(
        &self,
        with_user: &Principal,
        timestamp: Timestamp,
    ) -> Result<(), BackendError> {
        self.enter(ops::MARK_MESSAGE_AS_READ).await?;
        let mut state = self.state.write().await;
        let message = state
            .messages
            .iter_mut()
            .find(|m| {
                &m.sender == with_user && m.recipient == self.caller && m.timestamp == timestamp
            })
            .ok_or_else(|| BackendError::Rejected("message not found".to_string()))?;
        message.read = true;
        Ok(())
    }

    async fn get_all_events(&self) -> Result<Vec<(Event, Vec<Principal>)>, BackendError> {
        self.enter(ops::GET_ALL_EVENTS).await?;
        Ok(self.state.read().await.events.clone())
    }

    async fn create_event(
        &self,
        course_name: &str,
        description: &str,
    ) -> Result<(), BackendError> {
        self.enter(ops::CREATE_EVENT).await?;
        let mut state = self.state.write().await;
        let timestamp = state.next_timestamp();
        state.events.push((
            Event {
                creator: self.caller.clone(),
                course_name: course_name.to_owned(),
                description: description.to_owned(),
                timestamp,
            },
            Vec::new(),
        ));
        Ok(())
    }

    async fn rsvp_to_event(&self, event_id: EventId) -> Result<(), BackendError> {
        self.enter(ops::RSVP_TO_EVENT).await?;
        let mut state = self.state.write().await;
        let (_, attendees) = usize::try_from(event_id.as_u64())
            .ok()
            .and_then(|index| state.events.get_mut(index))
            .ok_or_else(|| BackendError::Rejected(format!("event {event_id} not found")))?;
        if !attendees.contains(&self.caller) {
            attendees.push(self.caller.clone());
        }
        Ok(())
    }

    async fn cancel_rsvp(&self, event_id: EventId) -> Result<(), BackendError> {
        self.enter(ops::CANCEL_RSVP).await?;
        let mut state = self.state.write().await;
        let (_, attendees) = usize::try_from(event_id.as_u64())
            .ok()
            .and_then(|index| state.events.get_mut(index))
            .ok_or_else(|| BackendError::Rejected(format!("event {event_id} not found")))?;
        attendees.retain(|p| p != &self.caller);
        Ok(())
    }

    async fn get_sponsors(&self) -> Result<Vec<String>, BackendError> {
        self.enter(ops::GET_SPONSORS).await?;
        Ok(self.state.read().await.sponsors.clone())
    }

    async fn add_course(
        &self,
        name: &str,
        website: &str,
        is_local: bool,
    ) -> Result<(), BackendError> {
        self.enter(ops::ADD_COURSE).await?;
        let mut state = self.state.write().await;
        if !state.admins.contains(&self.caller) {
            return Err(BackendError::Rejected(
                "Unauthorized: only admins can add courses".to_string(),
            ));
        }
        state.courses.push((
            name.to_owned(),
            CourseDetails {
                name: name.to_owned(),
                website: website.to_owned(),
                is_local,
            },
        ));
        Ok(())
    }

    async fn is_caller_admin(&self) -> Result<bool, BackendError> {
        self.enter(ops::IS_CALLER_ADMIN).await?;
        Ok(self.state.read().await.admins.contains(&self.caller))
    }
}
