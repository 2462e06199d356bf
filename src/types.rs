//! NewType wrappers for strong typing throughout the auth core.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing a handler name where a user identifier is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Stable identifier of a principal, as handed to `UserProvider`.
    ///
    /// This is whatever the surrounding application uses as the primary
    /// key of its user records, typically the value a handler pulled out
    /// of a session or a verified credential. It is opaque to the chain.
    UserId
);

newtype_string!(
    /// Name of an authentication handler as it appears in the chain.
    ///
    /// Used for registration, descriptor listing, and error reporting.
    /// Nothing enforces uniqueness; the chain is ordered, not keyed.
    HandlerName
);
