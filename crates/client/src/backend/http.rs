//! HTTP binding for the backend actor.
//!
//! Every operation is a `POST {base}/rpc/{operation}` carrying a JSON object
//! of named arguments. The reply is `{"ok": value}` or `{"err": message}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fairway_core::{
    CourseDetails, CourseWithMembers, Event, EventId, Message, Principal, Timestamp, UserProfile,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::{Backend, BackendError, ops};

/// Reply envelope returned by every RPC endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RpcReply<T> {
    Ok(T),
    Err(String),
}

/// Client for a backend reachable over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    endpoint: Url,
    identity: Option<SecretString>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("identity", &self.inner.identity.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: &Url,
        identity: Option<SecretString>,
        connect_timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;

        // Url::join drops the last path segment unless it ends with a slash
        let mut endpoint = base_url.clone();
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(HttpBackendInner {
                client,
                endpoint,
                identity,
            }),
        })
    }

    /// Call one backend operation.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        args: Value,
    ) -> Result<T, BackendError> {
        let url = self
            .inner
            .endpoint
            .join(&format!("rpc/{operation}"))
            .map_err(|e| BackendError::Rejected(format!("invalid operation URL: {e}")))?;

        let mut request = self.inner.client.post(url).json(&args);
        if let Some(identity) = &self.inner.identity {
            request = request.bearer_auth(identity.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let reply: RpcReply<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                operation,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend reply"
            );
            BackendError::Parse(e)
        })?;

        match reply {
            RpcReply::Ok(value) => Ok(value),
            RpcReply::Err(message) => {
                debug!(operation, %message, "Backend rejected call");
                Err(BackendError::Rejected(message))
            }
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self))]
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, BackendError> {
        self.call(ops::GET_CALLER_USER_PROFILE, json!({})).await
    }

    #[instrument(skip(self, profile))]
    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        self.call(ops::SAVE_CALLER_USER_PROFILE, json!({ "profile": profile }))
            .await
    }

    #[instrument(skip(self))]
    async fn search_matches(&self) -> Result<Vec<UserProfile>, BackendError> {
        self.call(ops::SEARCH_MATCHES, json!({})).await
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn get_user_profile(
        &self,
        user: &Principal,
    ) -> Result<Option<UserProfile>, BackendError> {
        self.call(ops::GET_USER_PROFILE, json!({ "user": user }))
            .await
    }

    #[instrument(skip(self))]
    async fn get_course_directory(&self) -> Result<Vec<(String, CourseDetails)>, BackendError> {
        self.call(ops::GET_COURSE_DIRECTORY, json!({})).await
    }

    #[instrument(skip(self))]
    async fn get_course_with_members(
        &self,
        course_name: &str,
    ) -> Result<Option<CourseWithMembers>, BackendError> {
        self.call(
            ops::GET_COURSE_WITH_MEMBERS,
            json!({ "courseName": course_name }),
        )
        .await
    }

    #[instrument(skip(self), fields(with_user = %with_user))]
    async fn get_messages(&self, with_user: &Principal) -> Result<Vec<Message>, BackendError> {
        self.call(ops::GET_MESSAGES, json!({ "withUser": with_user }))
            .await
    }

    #[instrument(skip(self, content), fields(recipient = %recipient))]
    async fn send_message(
        &self,
        recipient: &Principal,
        content: &str,
    ) -> Result<(), BackendError> {
        self.call(
            ops::SEND_MESSAGE,
            json!({ "recipient": recipient, "content": content }),
        )
        .await
    }

    #[instrument(skip(self), fields(with_user = %with_user))]
    async fn mark_message_as_read(
        &self,
        with_user: &Principal,
        timestamp: Timestamp,
    ) -> Result<(), BackendError> {
        self.call(
            ops::MARK_MESSAGE_AS_READ,
            json!({ "withUser": with_user, "timestamp": timestamp }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_all_events(&self) -> Result<Vec<(Event, Vec<Principal>)>, BackendError> {
        self.call(ops::GET_ALL_EVENTS, json!({})).await
    }

    #[instrument(skip(self, description))]
    async fn create_event(
        &self,
        course_name: &str,
        description: &str,
    ) -> Result<(), BackendError> {
        self.call(
            ops::CREATE_EVENT,
            json!({ "courseName": course_name, "description": description }),
        )
        .await
    }

    #[instrument(skip(self), fields(event_id = %event_id))]
    async fn rsvp_to_event(&self, event_id: EventId) -> Result<(), BackendError> {
        self.call(ops::RSVP_TO_EVENT, json!({ "eventId": event_id }))
            .await
    }

    #[instrument(skip(self), fields(event_id = %event_id))]
    async fn cancel_rsvp(&self, event_id: EventId) -> Result<(), BackendError> {
        self.call(ops::CANCEL_RSVP, json!({ "eventId": event_id }))
            .await
    }

    #[instrument(skip(self))]
    async fn get_sponsors(&self) -> Result<Vec<String>, BackendError> {
        self.call(ops::GET_SPONSORS, json!({})).await
    }

    #[instrument(skip(self))]
    async fn add_course(
        &self,
        name: &str,
        website: &str,
        is_local: bool,
    ) -> Result<(), BackendError> {
        self.call(
            ops::ADD_COURSE,
            json!({ "name": name, "website": website, "isLocal": is_local }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn is_caller_admin(&self) -> Result<bool, BackendError> {
        self.call(ops::IS_CALLER_ADMIN, json!({})).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_ok_unit_from_null() {
        let reply: RpcReply<()> = serde_json::from_str(r#"{"ok": null}"#).unwrap();
        assert!(matches!(reply, RpcReply::Ok(())));
    }

    #[test]
    fn test_reply_err() {
        let reply: RpcReply<Vec<String>> =
            serde_json::from_str(r#"{"err": "Unauthorized"}"#).unwrap();
        assert!(matches!(reply, RpcReply::Err(m) if m == "Unauthorized"));
    }

    #[test]
    fn test_endpoint_gets_trailing_slash() {
        let base = Url::parse("https://backend.example/api").unwrap();
        let backend = HttpBackend::new(&base, None, Duration::from_secs(1)).unwrap();
        assert_eq!(backend.inner.endpoint.as_str(), "https://backend.example/api/");
        let url = backend.inner.endpoint.join("rpc/getSponsors").unwrap();
        assert_eq!(url.as_str(), "https://backend.example/api/rpc/getSponsors");
    }

    #[test]
    fn test_debug_redacts_identity() {
        let base = Url::parse("https://backend.example").unwrap();
        let backend = HttpBackend::new(
            &base,
            Some(SecretString::from("identity-token-value")),
            Duration::from_secs(1),
        )
        .unwrap();
        let debug_output = format!("{backend:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("identity-token-value"));
    }
}
