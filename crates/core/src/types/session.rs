//! Logged-in session state.

use core::fmt;

use secrecy::SecretString;

use super::UserId;

/// An authenticated session.
///
/// Only exists when all three fields the backend hands back on login are
/// present. Partial state is represented by the absence of a `Session`,
/// never by a `Session` with empty fields.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
    user_id: UserId,
    first_name: String,
}

impl Session {
    /// Create a session from the fields returned by a successful login.
    #[must_use]
    pub fn new(token: SecretString, user_id: UserId, first_name: impl Into<String>) -> Self {
        Self {
            token,
            user_id,
            first_name: first_name.into(),
        }
    }

    /// Assemble a session from raw stored values.
    ///
    /// Returns `None` if any value is missing, empty, or if the user id
    /// does not parse.
    #[must_use]
    pub fn from_parts(
        token: Option<String>,
        user_id: Option<String>,
        first_name: Option<String>,
    ) -> Option<Self> {
        let token = token.filter(|t| !t.is_empty())?;
        let user_id = user_id?.parse::<UserId>().ok()?;
        let first_name = first_name?;
        Some(Self::new(SecretString::from(token), user_id, first_name))
    }

    /// Bearer token for authenticated requests.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("first_name", &self.first_name)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_owned())
    }

    #[test]
    fn test_from_parts_complete() {
        let session = Session::from_parts(some("tok"), some("5"), some("Dana")).unwrap();
        assert_eq!(session.user_id(), UserId::new(5));
        assert_eq!(session.first_name(), "Dana");
        assert_eq!(session.token().expose_secret(), "tok");
    }

    #[test]
    fn test_from_parts_partial_is_absent() {
        assert!(Session::from_parts(None, some("5"), some("Dana")).is_none());
        assert!(Session::from_parts(some("tok"), None, some("Dana")).is_none());
        assert!(Session::from_parts(some("tok"), some("5"), None).is_none());
        assert!(Session::from_parts(some(""), some("5"), some("Dana")).is_none());
        assert!(Session::from_parts(some("tok"), some("abc"), some("Dana")).is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new(SecretString::from("s3cr3t"), UserId::new(1), "Dana");
        let debug = format!("{session:?}");
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("[REDACTED]"));
    }
}
