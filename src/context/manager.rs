//! The published point of truth for "who is the current caller".
//!
//! `AuthContext` is a cheap cloneable handle over one [`ScopeStore`], so
//! every clone is the same logical instance; all state lives in the store,
//! partitioned per execution scope. The process-wide instance comes from
//! [`AuthContext::shared`]; tests build isolated ones with
//! [`AuthContext::new`].

use crate::context::store::ScopeStore;
use crate::model::{AuthResult, SharedUser};
use std::future::Future;
use std::sync::{Arc, OnceLock};

static SHARED: OnceLock<AuthContext> = OnceLock::new();

/// Scope-isolated authentication context.
#[derive(Clone, Default)]
pub struct AuthContext {
    store: Arc<ScopeStore>,
}

impl AuthContext {
    /// Create an isolated context with its own backing store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide shared context.
    ///
    /// Every call returns a handle to the same logical instance; state is
    /// still partitioned per execution scope by the backing store.
    pub fn shared() -> Self {
        SHARED.get_or_init(Self::new).clone()
    }

    /// Run `fut` inside a fresh execution scope of this context.
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        self.store.scope(fut).await
    }

    /// The currently authenticated principal, if any.
    pub fn user(&self) -> Option<SharedUser> {
        self.store.user()
    }

    /// True iff no principal is set for the current scope.
    pub fn is_guest(&self) -> bool {
        self.store.user().is_none()
    }

    /// Directly override the current principal.
    ///
    /// Bypasses result bookkeeping; for callers that manage identity
    /// without going through the dispatcher.
    pub fn set_user(&self, user: Option<SharedUser>) {
        self.store.set_user(user);
    }

    /// Record `result` as the last outcome and derive the current
    /// principal from it: set on success, cleared otherwise.
    ///
    /// This is the only path the dispatcher publishes through, which keeps
    /// the user and the last result consistent by construction.
    pub fn set_auth_result(&self, result: AuthResult) {
        let user = if result.is_success() {
            result.user().cloned()
        } else {
            None
        };
        self.store.set_result(result);
        self.store.set_user(user);
    }

    /// The last recorded outcome, if any.
    pub fn last_result(&self) -> Option<AuthResult> {
        self.store.result()
    }

    /// Reset the non-scoped fallback slot (test/CLI teardown).
    pub fn clear_fallback(&self) {
        self.store.clear_fallback();
    }
}
