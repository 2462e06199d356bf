//! User lookup contract.
//!
//! Applications wire their persistence behind [`UserProvider`]; handlers
//! resolve the identifier they extracted from a credential into a live
//! principal through it. Lookup may suspend (database, remote directory).

use crate::model::SharedUser;
use crate::types::UserId;
use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Loads a principal by its stable identifier.
///
/// Returns `Ok(None)` when the user no longer exists or has been disabled.
pub trait UserProvider: Send + Sync {
    /// Find a principal by identifier.
    fn find_by_id<'a>(
        &'a self,
        id: &'a UserId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<SharedUser>>> + Send + 'a>>;
}

/// Map-backed provider for tests and single-process deployments.
#[derive(Default)]
pub struct StaticUserProvider {
    users: HashMap<UserId, SharedUser>,
}

impl StaticUserProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a principal, keyed by its `auth_id`.
    pub fn with_user(mut self, user: SharedUser) -> Self {
        self.users.insert(UserId::new(user.auth_id()), user);
        self
    }

    /// Number of known principals.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the provider is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserProvider for StaticUserProvider {
    fn find_by_id<'a>(
        &'a self,
        id: &'a UserId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<SharedUser>>> + Send + 'a>> {
        let found = self.users.get(id).cloned();
        Box::pin(async move { Ok(found) })
    }
}

/// Convenience alias for a shared provider handle.
pub type SharedUserProvider = Arc<dyn UserProvider>;
