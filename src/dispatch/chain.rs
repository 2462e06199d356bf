//! Handler contract and the priority-ordered handler chain.
//!
//! Provides the `AuthHandler` trait for implementing authentication
//! strategies and a `HandlerChain` built once at startup from explicit
//! registrations.

use crate::model::AuthResult;
use crate::payload::Payload;
use crate::session::SharedSession;
use crate::types::HandlerName;
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Trait for handling one authentication strategy.
///
/// `handle` returns:
/// - `Ok(None)`: no opinion, the chain moves on;
/// - `Ok(Some(result))`: an explicit success or failure;
/// - `Err(_)`: a broken authentication path, fatal to the dispatch.
pub trait AuthHandler: Send + Sync {
    /// Returns the handler's name (e.g., "session").
    fn name(&self) -> &str;

    /// Evaluates the payload.
    ///
    /// Must not return `Err` for "cannot authenticate"; only `Ok(None)`
    /// signals that.
    fn handle<'a>(
        &'a self,
        payload: &'a dyn Payload,
    ) -> Pin<Box<dyn Future<Output = Result<Option<AuthResult>>> + Send + 'a>>;

    /// Capability probe for request-scoped session binding.
    ///
    /// Handlers that want the current request's session injected at
    /// resolution time override this to return `Some(self)`.
    fn as_session_aware(&mut self) -> Option<&mut dyn SessionAware> {
        None
    }
}

/// Optional capability: receive the current request's session at
/// resolution time instead of pulling it off the payload.
pub trait SessionAware {
    /// Attach the request's session.
    fn bind_session(&mut self, session: SharedSession);
}

/// Builds a fresh handler instance for one dispatch.
///
/// Used when a handler carries request-scoped collaborators and therefore
/// cannot be shared across calls. Construction may fail (a collaborator is
/// unavailable); the dispatcher treats that as "handler unavailable for
/// this call", not as an abort.
pub trait HandlerFactory: Send + Sync {
    /// Construct a handler instance.
    fn create(&self) -> Result<Box<dyn AuthHandler>>;
}

impl<F> HandlerFactory for F
where
    F: Fn() -> Result<Box<dyn AuthHandler>> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn AuthHandler>> {
        self()
    }
}

/// How a descriptor obtains its handler instance at dispatch time.
#[derive(Clone)]
pub enum HandlerSource {
    /// One process-wide instance reused across calls.
    Shared(Arc<dyn AuthHandler>),
    /// A fresh instance constructed per dispatch.
    Factory(Arc<dyn HandlerFactory>),
}

/// Discovery input: one candidate handler with its chain position.
pub struct HandlerRegistration {
    name: HandlerName,
    priority: i32,
    source: HandlerSource,
    disabled: bool,
}

impl HandlerRegistration {
    /// Register a shared handler instance at the default priority (0).
    pub fn shared(handler: Arc<dyn AuthHandler>) -> Self {
        Self {
            name: HandlerName::new(handler.name()),
            priority: 0,
            source: HandlerSource::Shared(handler),
            disabled: false,
        }
    }

    /// Register a per-dispatch factory at the default priority (0).
    pub fn factory<F>(name: impl Into<HandlerName>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn AuthHandler>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            priority: 0,
            source: HandlerSource::Factory(Arc::new(factory)),
            disabled: false,
        }
    }

    /// Set the chain priority; lower values run earlier.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Exclude this registration at build time.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// The registration's name.
    pub fn name(&self) -> &HandlerName {
        &self.name
    }

    /// The registration's priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// One entry of a built chain.
pub struct HandlerDescriptor {
    name: HandlerName,
    priority: i32,
    source: HandlerSource,
}

impl HandlerDescriptor {
    /// The handler's name.
    pub fn name(&self) -> &HandlerName {
        &self.name
    }

    /// The priority it was registered with.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// How to obtain an instance.
    pub fn source(&self) -> &HandlerSource {
        &self.source
    }
}

/// Ordered, priority-sorted list of handler descriptors.
///
/// Built once at startup and treated as read-only by all concurrent
/// callers thereafter; safe to share behind an `Arc` without locking.
#[derive(Default)]
pub struct HandlerChain {
    descriptors: Vec<HandlerDescriptor>,
}

impl HandlerChain {
    /// A chain with no handlers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a chain from discovery input.
    ///
    /// Disabled registrations are filtered out; the rest are sorted by
    /// ascending priority. The sort is stable, so registrations with equal
    /// priority keep the order they were supplied in.
    pub fn build(registrations: Vec<HandlerRegistration>) -> Self {
        let mut descriptors: Vec<HandlerDescriptor> = registrations
            .into_iter()
            .filter(|registration| !registration.disabled)
            .map(|registration| HandlerDescriptor {
                name: registration.name,
                priority: registration.priority,
                source: registration.source,
            })
            .collect();

        descriptors.sort_by_key(|descriptor| descriptor.priority);

        Self { descriptors }
    }

    /// Append a handler to the live list without re-sorting.
    ///
    /// Appended handlers run after all priority-sorted ones; useful in
    /// tests or when wiring manually without build-time registration.
    pub fn add_handler(&mut self, handler: Arc<dyn AuthHandler>) {
        self.descriptors.push(HandlerDescriptor {
            name: HandlerName::new(handler.name()),
            priority: 0,
            source: HandlerSource::Shared(handler),
        });
    }

    /// The descriptors in invocation order.
    pub fn descriptors(&self) -> &[HandlerDescriptor] {
        &self.descriptors
    }

    /// Handler names in invocation order.
    pub fn names(&self) -> Vec<HandlerName> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.name.clone())
            .collect()
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the chain has no descriptors.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
