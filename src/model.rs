//! Core value types passed between every other component.
//!
//! `Authenticatable` is the opaque principal contract; `AuthResult` is the
//! immutable outcome of a single handler (or of a whole chain evaluation).

use crate::types::UserId;
use std::fmt;
use std::sync::Arc;

/// An authenticated principal.
///
/// Implemented by whatever user type the surrounding application has.
/// Handlers produce principals behind `Arc`, and everything downstream
/// treats them as read-only.
pub trait Authenticatable: fmt::Debug + Send + Sync {
    /// Stable identifier of this principal (usually the primary key).
    fn auth_id(&self) -> &str;

    /// Display-friendly name for logs and UIs.
    fn display_name(&self) -> &str {
        self.auth_id()
    }
}

/// Shared handle to a principal.
pub type SharedUser = Arc<dyn Authenticatable>;

/// A minimal concrete principal.
///
/// Useful for tests, local single-user deployments, and applications that
/// do not carry their own user type through authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    id: UserId,
    email: Option<String>,
    display_name: Option<String>,
}

impl AuthUser {
    /// Create a principal with just an identifier.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach a display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// The principal's identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Email address, if known.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl Authenticatable for AuthUser {
    fn auth_id(&self) -> &str {
        self.id.as_str()
    }

    fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// Outcome of an authentication attempt.
///
/// Immutable; constructed only through [`AuthResult::success`] and
/// [`AuthResult::failed`], so a successful result always carries a user
/// and a failed result never does.
#[derive(Debug, Clone)]
pub struct AuthResult {
    success: bool,
    user: Option<SharedUser>,
    message: Option<String>,
}

impl AuthResult {
    /// A successful authentication of `user`.
    pub fn success(user: SharedUser) -> Self {
        Self {
            success: true,
            user: Some(user),
            message: None,
        }
    }

    /// A failed authentication with a human-readable reason.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            message: Some(message.into()),
        }
    }

    /// Whether authentication succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The authenticated principal; present iff `is_success()`.
    pub fn user(&self) -> Option<&SharedUser> {
        self.user.as_ref()
    }

    /// Failure reason; present iff not `is_success()`.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl PartialEq for AuthResult {
    fn eq(&self, other: &Self) -> bool {
        let users_match = match (&self.user, &other.user) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a.auth_id() == b.auth_id(),
            (None, None) => true,
            _ => false,
        };
        self.success == other.success && self.message == other.message && users_match
    }
}

impl fmt::Display for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.user, &self.message) {
            (Some(user), _) => write!(f, "authenticated as {}", user.auth_id()),
            (None, Some(msg)) => write!(f, "authentication failed: {}", msg),
            (None, None) => write!(f, "authentication failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_carries_user() {
        let user: SharedUser = Arc::new(AuthUser::new("42"));
        let result = AuthResult::success(user);

        assert!(result.is_success());
        assert_eq!(result.user().unwrap().auth_id(), "42");
        assert!(result.message().is_none());
    }

    #[test]
    fn test_failed_carries_message_only() {
        let result = AuthResult::failed("User not found");

        assert!(!result.is_success());
        assert!(result.user().is_none());
        assert_eq!(result.message(), Some("User not found"));
    }

    #[test]
    fn test_result_equality() {
        let a: SharedUser = Arc::new(AuthUser::new("42"));
        let b: SharedUser = Arc::new(AuthUser::new("42"));
        let c: SharedUser = Arc::new(AuthUser::new("99"));

        assert_eq!(AuthResult::success(a.clone()), AuthResult::success(b));
        assert_ne!(AuthResult::success(a.clone()), AuthResult::success(c));
        assert_eq!(
            AuthResult::failed("User not found"),
            AuthResult::failed("User not found")
        );
        assert_ne!(AuthResult::failed("nope"), AuthResult::success(a));
    }

    #[test]
    fn test_result_display() {
        let user: SharedUser = Arc::new(AuthUser::new("42"));
        assert_eq!(
            AuthResult::success(user).to_string(),
            "authenticated as 42"
        );
        assert_eq!(
            AuthResult::failed("User not found").to_string(),
            "authentication failed: User not found"
        );
    }

    #[test]
    fn test_auth_user_display_name_fallbacks() {
        let bare = AuthUser::new("42");
        assert_eq!(bare.display_name(), "42");

        let with_email = AuthUser::new("42").with_email("u@example.com");
        assert_eq!(with_email.display_name(), "u@example.com");

        let named = AuthUser::new("42")
            .with_email("u@example.com")
            .with_display_name("Uma");
        assert_eq!(named.display_name(), "Uma");
        assert_eq!(named.email(), Some("u@example.com"));
    }
}
