//! Request payload contract.
//!
//! Handlers are polymorphic over this single surface; the dispatcher never
//! interprets payload contents itself.

use crate::session::SharedSession;

/// What an incoming request exposes to authentication handlers.
pub trait Payload: Send + Sync {
    /// Session-like state attached to this request, if any.
    fn session(&self) -> Option<SharedSession>;

    /// Bearer credential presented with this request, if any.
    ///
    /// Transports that do not carry credentials can leave the default.
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Plain payload carrier for transports that have already extracted the
/// relevant request state, and for tests.
#[derive(Default)]
pub struct RequestPayload {
    session: Option<SharedSession>,
    bearer: Option<String>,
}

impl RequestPayload {
    /// A payload with no session and no credentials.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach a session.
    pub fn with_session(mut self, session: SharedSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach a bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

impl Payload for RequestPayload {
    fn session(&self) -> Option<SharedSession> {
        self.session.clone()
    }

    fn bearer_token(&self) -> Option<String> {
        self.bearer.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySession, Session};
    use serde_json::json;

    #[test]
    fn test_empty_payload() {
        let payload = RequestPayload::empty();
        assert!(payload.session().is_none());
        assert!(payload.bearer_token().is_none());
    }

    #[test]
    fn test_payload_with_session() {
        let session = MemorySession::shared();
        session.insert("k", json!("v"));

        let payload = RequestPayload::empty().with_session(session);
        assert_eq!(payload.session().unwrap().get("k"), Some(json!("v")));
    }

    #[test]
    fn test_payload_with_bearer_token() {
        let payload = RequestPayload::empty().with_bearer_token("tok_abc");
        assert_eq!(payload.bearer_token().as_deref(), Some("tok_abc"));
    }
}
