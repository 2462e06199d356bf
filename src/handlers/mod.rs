//! Built-in authentication handlers.
//!
//! Both are ordinary [`AuthHandler`](crate::dispatch::AuthHandler)
//! implementations; applications register them alongside their own.

mod session;
mod token;

pub use session::{SESSION_USER_KEY, SessionAuthHandler};
pub use token::{StaticTokenVerifier, TokenAuthHandler, TokenVerifier};
