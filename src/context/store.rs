//! Task-isolated storage for authentication state.
//!
//! Each logical request runs inside [`ScopeStore::scope`], which installs a
//! fresh [`ScopeId`] in a tokio task-local. Every read or write re-checks
//! the task-local at call time, so a request that suspends and resumes on a
//! different worker thread still touches only its own entry. Outside of any
//! scope (CLI tools, plain tests) a single process-wide fallback slot is
//! used instead.

use crate::model::{AuthResult, SharedUser};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

tokio::task_local! {
    static CURRENT_SCOPE: ScopeId;
}

/// Identifier of one concurrent unit of execution.
///
/// Only ever used as a lookup key; never stored as an owning reference to
/// the task it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The scope the calling task is currently executing in, if any.
    ///
    /// Cheap enough to check on every store access.
    pub fn current() -> Option<ScopeId> {
        CURRENT_SCOPE.try_with(|id| *id).ok()
    }
}

/// Per-scope mutable cell.
#[derive(Default)]
struct ContextEntry {
    user: Option<SharedUser>,
    result: Option<AuthResult>,
}

/// Maps the currently executing task to its isolated authentication state.
#[derive(Default)]
pub struct ScopeStore {
    entries: Mutex<HashMap<ScopeId, ContextEntry>>,
    fallback: Mutex<ContextEntry>,
}

/// Removes the scope's entry when the scope future completes or is
/// dropped mid-flight (cancellation).
struct EntryGuard<'a> {
    store: &'a ScopeStore,
    id: ScopeId,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.store.lock_entries().remove(&self.id);
    }
}

impl ScopeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` inside a fresh execution scope.
    ///
    /// All store accesses made while `fut` is polled (on whatever worker
    /// thread) hit an entry private to this scope. The entry is discarded
    /// when `fut` finishes or the scope future is dropped.
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        let id = ScopeId::next();
        let _guard = EntryGuard { store: self, id };
        CURRENT_SCOPE.scope(id, fut).await
    }

    /// Set the current principal for the active scope (or the fallback).
    pub fn set_user(&self, user: Option<SharedUser>) {
        match ScopeId::current() {
            Some(id) => {
                self.lock_entries().entry(id).or_default().user = user;
            }
            None => self.lock_fallback().user = user,
        }
    }

    /// Current principal for the active scope (or the fallback).
    pub fn user(&self) -> Option<SharedUser> {
        match ScopeId::current() {
            Some(id) => self
                .lock_entries()
                .get(&id)
                .and_then(|entry| entry.user.clone()),
            None => self.lock_fallback().user.clone(),
        }
    }

    /// Record the last full result for the active scope (or the fallback).
    pub fn set_result(&self, result: AuthResult) {
        match ScopeId::current() {
            Some(id) => {
                self.lock_entries().entry(id).or_default().result = Some(result);
            }
            None => self.lock_fallback().result = Some(result),
        }
    }

    /// Last recorded result for the active scope (or the fallback).
    pub fn result(&self) -> Option<AuthResult> {
        match ScopeId::current() {
            Some(id) => self
                .lock_entries()
                .get(&id)
                .and_then(|entry| entry.result.clone()),
            None => self.lock_fallback().result.clone(),
        }
    }

    /// Reset the process-wide fallback slot only.
    ///
    /// Per-scope entries are untouched; those are reclaimed automatically
    /// when their scope ends.
    pub fn clear_fallback(&self) {
        *self.lock_fallback() = ContextEntry::default();
    }

    /// Number of live scope entries. Entries are created lazily, so a
    /// scope that never wrote anything does not count.
    pub fn entry_count(&self) -> usize {
        self.lock_entries().len()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<ScopeId, ContextEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_fallback(&self) -> MutexGuard<'_, ContextEntry> {
        self.fallback.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
