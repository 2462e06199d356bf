//! Handler-chain dispatch engine.
//!
//! [`HandlerChain`] is built once from explicit registrations;
//! [`Dispatcher`] evaluates it per request under the configured strategy.

mod chain;
mod dispatcher;

pub use chain::{
    AuthHandler, HandlerChain, HandlerDescriptor, HandlerFactory, HandlerRegistration,
    HandlerSource, SessionAware,
};
pub use dispatcher::{DispatchError, Dispatcher};
