//! Bearer-token authentication.
//!
//! Verification of the credential itself (signatures, expiry, revocation)
//! lives behind [`TokenVerifier`]; this handler only orchestrates
//! verify-then-lookup.

use crate::dispatch::AuthHandler;
use crate::model::AuthResult;
use crate::payload::Payload;
use crate::provider::SharedUserProvider;
use crate::types::UserId;
use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Maps a presented token to the identifier of the principal it belongs
/// to. `Ok(None)` means the token is invalid, expired, or revoked.
pub trait TokenVerifier: Send + Sync {
    /// Verify a raw bearer token.
    fn verify<'a>(
        &'a self,
        token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<UserId>>> + Send + 'a>>;
}

/// Map-backed verifier for tests and simple deployments.
#[derive(Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenVerifier {
    /// Create an empty verifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as belonging to `user_id`.
    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify<'a>(
        &'a self,
        token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<UserId>>> + Send + 'a>> {
        let found = self.tokens.get(token).cloned();
        Box::pin(async move { Ok(found) })
    }
}

/// Authenticates a request from its bearer token.
///
/// No token on the payload means no opinion; a token the verifier rejects
/// or that resolves to no user is an explicit failure.
pub struct TokenAuthHandler {
    verifier: Arc<dyn TokenVerifier>,
    users: SharedUserProvider,
}

impl TokenAuthHandler {
    /// Default chain priority; runs after session authentication.
    pub const PRIORITY: i32 = 10;

    /// Create a handler from a verifier and a user provider.
    pub fn new(verifier: Arc<dyn TokenVerifier>, users: SharedUserProvider) -> Self {
        Self { verifier, users }
    }
}

impl AuthHandler for TokenAuthHandler {
    fn name(&self) -> &str {
        "token"
    }

    fn handle<'a>(
        &'a self,
        payload: &'a dyn Payload,
    ) -> Pin<Box<dyn Future<Output = Result<Option<AuthResult>>> + Send + 'a>> {
        Box::pin(async move {
            let Some(token) = payload.bearer_token() else {
                return Ok(None);
            };

            let Some(user_id) = self.verifier.verify(&token).await? else {
                return Ok(Some(AuthResult::failed("Invalid or expired token")));
            };

            match self.users.find_by_id(&user_id).await? {
                Some(user) => Ok(Some(AuthResult::success(user))),
                None => Ok(Some(AuthResult::failed("User not found"))),
            }
        })
    }
}
