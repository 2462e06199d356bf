//! Session-based authentication.

use crate::dispatch::{AuthHandler, SessionAware};
use crate::model::AuthResult;
use crate::payload::Payload;
use crate::provider::SharedUserProvider;
use crate::session::SharedSession;
use crate::types::UserId;
use anyhow::Result;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Session key the authenticated user's identifier is stored under.
pub const SESSION_USER_KEY: &str = "_auth_user_id";

/// Authenticates a request from the user identifier stored in its session.
///
/// With no session or no stored identifier, this handler has no opinion.
/// A stored identifier that no longer resolves to a user is treated as a
/// stale login: the key is dropped from the session and the handler
/// returns an explicit failure.
pub struct SessionAuthHandler {
    users: SharedUserProvider,
    session: Option<SharedSession>,
}

impl SessionAuthHandler {
    /// Default chain priority.
    pub const PRIORITY: i32 = 0;

    /// Create a handler backed by the given user provider.
    ///
    /// The session is normally taken from the payload; a request-scoped
    /// resolver may bind one directly instead via [`SessionAware`].
    pub fn new(users: SharedUserProvider) -> Self {
        Self {
            users,
            session: None,
        }
    }
}

impl AuthHandler for SessionAuthHandler {
    fn name(&self) -> &str {
        "session"
    }

    fn handle<'a>(
        &'a self,
        payload: &'a dyn Payload,
    ) -> Pin<Box<dyn Future<Output = Result<Option<AuthResult>>> + Send + 'a>> {
        Box::pin(async move {
            let Some(session) = self.session.clone().or_else(|| payload.session()) else {
                return Ok(None);
            };

            let user_id = match session.get(SESSION_USER_KEY) {
                None | Some(Value::Null) => return Ok(None),
                Some(Value::String(s)) => UserId::new(s),
                // Numeric ids end up stored as numbers; stringify them.
                Some(other) => UserId::new(other.to_string()),
            };

            match self.users.find_by_id(&user_id).await? {
                Some(user) => Ok(Some(AuthResult::success(user))),
                None => {
                    session.forget(SESSION_USER_KEY);
                    Ok(Some(AuthResult::failed("User not found")))
                }
            }
        })
    }

    fn as_session_aware(&mut self) -> Option<&mut dyn SessionAware> {
        Some(self)
    }
}

impl SessionAware for SessionAuthHandler {
    fn bind_session(&mut self, session: SharedSession) {
        self.session = Some(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::context::AuthContext;
    use crate::dispatch::{Dispatcher, HandlerChain, HandlerRegistration};
    use crate::model::{AuthResult, AuthUser};
    use crate::payload::RequestPayload;
    use crate::provider::StaticUserProvider;
    use crate::session::{MemorySession, Session};
    use serde_json::json;
    use std::sync::Arc;

    fn provider_with_user_42() -> SharedUserProvider {
        Arc::new(
            StaticUserProvider::new()
                .with_user(Arc::new(AuthUser::new("42").with_display_name("Uma"))),
        )
    }

    fn session_dispatcher(users: SharedUserProvider) -> Dispatcher {
        let chain = HandlerChain::build(vec![
            HandlerRegistration::shared(Arc::new(SessionAuthHandler::new(users)))
                .with_priority(SessionAuthHandler::PRIORITY),
        ]);
        Dispatcher::new(Arc::new(chain), AuthContext::new(), AuthConfig::first_match())
    }

    #[tokio::test]
    async fn test_stored_id_resolves_to_user() {
        let session = MemorySession::shared();
        session.insert(SESSION_USER_KEY, json!("42"));
        let payload = RequestPayload::empty().with_session(session);

        let dispatcher = session_dispatcher(provider_with_user_42());
        dispatcher.handle(&payload).await.unwrap();

        let context = dispatcher.context();
        assert_eq!(context.user().unwrap().auth_id(), "42");
        assert!(context.last_result().unwrap().is_success());
    }

    #[tokio::test]
    async fn test_no_stored_id_means_no_opinion() {
        let payload = RequestPayload::empty().with_session(MemorySession::shared());

        let dispatcher = session_dispatcher(provider_with_user_42());
        dispatcher.handle(&payload).await.unwrap();

        assert!(dispatcher.context().is_guest());
        assert!(dispatcher.context().last_result().is_none());
    }

    #[tokio::test]
    async fn test_unknown_stored_id_fails_and_forgets() {
        let session = MemorySession::shared();
        session.insert(SESSION_USER_KEY, json!("99"));
        let payload = RequestPayload::empty().with_session(session.clone());

        let dispatcher = session_dispatcher(provider_with_user_42());
        dispatcher.handle(&payload).await.unwrap();

        let context = dispatcher.context();
        assert!(context.is_guest());
        assert_eq!(
            context.last_result(),
            Some(AuthResult::failed("User not found"))
        );
        // The stale login was dropped from the session.
        assert!(session.get(SESSION_USER_KEY).is_none());
    }

    #[tokio::test]
    async fn test_no_session_means_no_opinion() {
        let handler = SessionAuthHandler::new(provider_with_user_42());
        let outcome = handler.handle(&RequestPayload::empty()).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_numeric_stored_id_is_stringified() {
        let session = MemorySession::shared();
        session.insert(SESSION_USER_KEY, json!(42));

        let handler = SessionAuthHandler::new(provider_with_user_42());
        let payload = RequestPayload::empty().with_session(session);

        let outcome = handler.handle(&payload).await.unwrap().unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.user().unwrap().auth_id(), "42");
    }

    #[tokio::test]
    async fn test_null_stored_id_means_no_opinion() {
        let session = MemorySession::shared();
        session.insert(SESSION_USER_KEY, json!(null));

        let handler = SessionAuthHandler::new(provider_with_user_42());
        let payload = RequestPayload::empty().with_session(session);

        assert!(handler.handle(&payload).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bound_session_overrides_payload() {
        let bound = MemorySession::shared();
        bound.insert(SESSION_USER_KEY, json!("42"));

        let mut handler = SessionAuthHandler::new(provider_with_user_42());
        handler.bind_session(bound);

        // The payload's own (empty) session is ignored once one is bound.
        let payload = RequestPayload::empty().with_session(MemorySession::shared());
        let outcome = handler.handle(&payload).await.unwrap().unwrap();
        assert!(outcome.is_success());
    }
}
