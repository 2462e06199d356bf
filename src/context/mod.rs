//! Concurrency-isolated authentication context.
//!
//! [`ScopeStore`] keys state by the currently executing task;
//! [`AuthContext`] is the handle the rest of the system reads identity
//! through.

mod manager;
mod store;

pub use manager::AuthContext;
pub use store::{ScopeId, ScopeStore};
