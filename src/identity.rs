//! Explicit user identity passed into every engine call.
//!
//! There is deliberately no ambient "current user" lookup anywhere in this
//! crate. Callers resolve the session once and hand the result down.

/// Who is using the app right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    user_id: Option<String>,
    is_anonymous: bool,
}

impl UserIdentity {
    /// A signed-in user with a stable account id.
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_anonymous: false,
        }
    }

    /// An anonymous session that still carries a provider-assigned id.
    /// Treated the same as a guest: nothing is persisted for it.
    pub fn anonymous(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_anonymous: true,
        }
    }

    /// No session at all.
    pub fn guest() -> Self {
        Self {
            user_id: None,
            is_anonymous: true,
        }
    }

    /// The user id to persist under, or `None` for guest/anonymous
    /// sessions (which never touch storage).
    pub fn resolved_user(&self) -> Option<&str> {
        if self.is_anonymous {
            return None;
        }
        self.user_id.as_deref()
    }

    pub fn is_guest(&self) -> bool {
        self.resolved_user().is_none()
    }
}
