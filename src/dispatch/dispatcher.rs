//! Chain evaluation and outcome publication.
//!
//! The dispatcher walks the chain strictly in order, resolves each
//! descriptor to a live handler at call time, and publishes the outcome
//! into the [`AuthContext`]. Handlers within one call never run in
//! parallel: later handlers' applicability may depend on what earlier
//! ones left in the context.

use crate::config::{AuthConfig, Strategy};
use crate::context::AuthContext;
use crate::dispatch::chain::{AuthHandler, HandlerChain, HandlerDescriptor, HandlerSource};
use crate::model::AuthResult;
use crate::payload::Payload;
use crate::session::SharedSession;
use crate::types::HandlerName;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fatal dispatch failures.
///
/// Recoverable conditions (no-opinion, explicit auth failure, resolution
/// failure) never surface here; they are absorbed by the evaluation loop.
#[derive(Debug)]
pub enum DispatchError {
    /// A handler's `handle()` returned an error. Propagated rather than
    /// swallowed: a broken authentication path must fail the request.
    Handler {
        /// Which handler failed.
        handler: HandlerName,
        /// The underlying error.
        source: anyhow::Error,
    },
    /// Every handler succeeded under `all_required` but no principal was
    /// established in the context, which means a handler is broken.
    MissingIdentity,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler { handler, source } => {
                write!(f, "Auth handler `{}` failed: {}", handler, source)
            }
            Self::MissingIdentity => {
                write!(f, "No user set after all auth handlers succeeded")
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Handler { source, .. } => Some(source.as_ref()),
            Self::MissingIdentity => None,
        }
    }
}

/// A handler instance resolved for one dispatch.
enum ResolvedHandler {
    Shared(Arc<dyn AuthHandler>),
    Owned(Box<dyn AuthHandler>),
}

impl ResolvedHandler {
    fn as_handler(&self) -> &dyn AuthHandler {
        match self {
            Self::Shared(handler) => handler.as_ref(),
            Self::Owned(handler) => handler.as_ref(),
        }
    }
}

/// Evaluates the handler chain against incoming payloads.
pub struct Dispatcher {
    chain: Arc<HandlerChain>,
    context: AuthContext,
    enabled: bool,
    strategy: Strategy,
}

impl Dispatcher {
    /// Create a dispatcher over a built chain.
    pub fn new(chain: Arc<HandlerChain>, context: AuthContext, config: AuthConfig) -> Self {
        Self {
            chain,
            context,
            enabled: config.enabled,
            strategy: config.strategy,
        }
    }

    /// Whether dispatch is enabled at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The configured evaluation strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The context outcomes are published into.
    pub fn context(&self) -> &AuthContext {
        &self.context
    }

    /// The chain being evaluated.
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// Evaluate the chain against `payload`.
    ///
    /// When disabled, this is a no-op and the context is left untouched.
    /// When the chain finds no match, the context is likewise untouched
    /// and the caller simply observes `is_guest()`.
    pub async fn handle(&self, payload: &dyn Payload) -> Result<(), DispatchError> {
        if !self.enabled {
            debug!("Auth dispatch disabled; skipping {} handlers", self.chain.len());
            return Ok(());
        }

        match self.strategy {
            Strategy::FirstMatch => self.run_first_match(payload).await,
            Strategy::AllRequired => self.run_all_required(payload).await,
        }
    }

    /// Stop at the first successful handler; a failed result is not
    /// terminal, only a success short-circuits.
    async fn run_first_match(&self, payload: &dyn Payload) -> Result<(), DispatchError> {
        let session = payload.session();

        for descriptor in self.chain.descriptors() {
            let Some(handler) = self.resolve(descriptor, session.as_ref()) else {
                continue;
            };

            let outcome = self.invoke(&handler, descriptor, payload).await?;

            match outcome {
                Some(result) if result.is_success() => {
                    debug!("Authenticated by handler `{}`", descriptor.name());
                    self.context.set_auth_result(result);
                    return Ok(());
                }
                Some(result) => {
                    debug!(
                        "Handler `{}` rejected: {}; trying next",
                        descriptor.name(),
                        result.message().unwrap_or("no reason given")
                    );
                }
                None => {}
            }
        }

        debug!("Auth chain exhausted with no match");
        Ok(())
    }

    /// Every handler must succeed; the first no-opinion or failure ends
    /// evaluation with no context update. Handlers are expected to have
    /// progressively established identity themselves, so a completed
    /// chain with no user in the context is a configuration error.
    async fn run_all_required(&self, payload: &dyn Payload) -> Result<(), DispatchError> {
        let session = payload.session();

        for descriptor in self.chain.descriptors() {
            let Some(handler) = self.resolve(descriptor, session.as_ref()) else {
                continue;
            };

            let outcome = self.invoke(&handler, descriptor, payload).await?;

            match outcome {
                Some(result) if result.is_success() => {}
                _ => {
                    debug!(
                        "Handler `{}` did not succeed; authentication incomplete",
                        descriptor.name()
                    );
                    return Ok(());
                }
            }
        }

        let user = self
            .context
            .user()
            .ok_or(DispatchError::MissingIdentity)?;
        self.context.set_auth_result(AuthResult::success(user));
        Ok(())
    }

    async fn invoke(
        &self,
        handler: &ResolvedHandler,
        descriptor: &HandlerDescriptor,
        payload: &dyn Payload,
    ) -> Result<Option<AuthResult>, DispatchError> {
        handler
            .as_handler()
            .handle(payload)
            .await
            .map_err(|source| DispatchError::Handler {
                handler: descriptor.name().clone(),
                source,
            })
    }

    /// Resolve a descriptor to a live handler for this call.
    ///
    /// Factory errors make the handler unavailable for this call only;
    /// the chain moves on. Freshly constructed handlers that expose the
    /// session-binding capability get the current request's session;
    /// having no session to bind is not an error.
    fn resolve(
        &self,
        descriptor: &HandlerDescriptor,
        session: Option<&SharedSession>,
    ) -> Option<ResolvedHandler> {
        match descriptor.source() {
            HandlerSource::Shared(handler) => Some(ResolvedHandler::Shared(handler.clone())),
            HandlerSource::Factory(factory) => match factory.create() {
                Ok(mut handler) => {
                    if let Some(aware) = handler.as_session_aware()
                        && let Some(session) = session
                    {
                        aware.bind_session(session.clone());
                    }
                    Some(ResolvedHandler::Owned(handler))
                }
                Err(e) => {
                    warn!(
                        "Could not resolve auth handler `{}`: {}; skipping",
                        descriptor.name(),
                        e
                    );
                    None
                }
            },
        }
    }
}
