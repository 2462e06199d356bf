//! Authentication orchestration core.
//!
//! A priority-ordered chain of pluggable authentication handlers is
//! evaluated against each incoming request payload; the winning identity
//! is published through an [`AuthContext`] whose state is isolated per
//! concurrent request, so interleaved requests sharing one process never
//! observe each other's authentication.

// Core modules
mod config;
mod model;
mod payload;
mod provider;
mod session;
mod types;

// Context isolation and chain dispatch
mod context;
mod dispatch;
pub mod handlers;

// Re-export key types and functions
pub use config::{AuthConfig, ParseStrategyError, Strategy};
pub use context::{AuthContext, ScopeId, ScopeStore};
pub use dispatch::{
    AuthHandler, DispatchError, Dispatcher, HandlerChain, HandlerDescriptor, HandlerFactory,
    HandlerRegistration, HandlerSource, SessionAware,
};
pub use model::{AuthResult, AuthUser, Authenticatable, SharedUser};
pub use payload::{Payload, RequestPayload};
pub use provider::{SharedUserProvider, StaticUserProvider, UserProvider};
pub use session::{MemorySession, Session, SharedSession};
pub use types::{HandlerName, UserId};

use std::sync::Arc;

/// Convenience function to create a fully wired dispatcher.
///
/// Builds the chain from `registrations` and publishes outcomes into the
/// process-wide shared [`AuthContext`]. Callers that want an isolated
/// context (tests, embedded setups) can wire [`Dispatcher::new`]
/// themselves.
pub fn create_dispatcher(
    config: AuthConfig,
    registrations: Vec<HandlerRegistration>,
) -> Dispatcher {
    let chain = Arc::new(HandlerChain::build(registrations));
    Dispatcher::new(chain, AuthContext::shared(), config)
}
