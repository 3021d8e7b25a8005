use std::sync::Arc;

use pitchside_shared::uac::{PermissionIndex, UserProfile};

/// Lifecycle of the process-wide session
///
/// Exactly one value is live at a time and only the client's own transition
/// methods replace it. There is no terminal state: the session cycles between
/// `Authenticated` and `Unauthenticated` via login/logout for the lifetime of
/// the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    /// A resolution of the stored token is in flight
    Resolving,
    Authenticated {
        profile: Arc<UserProfile>,
        permissions: Arc<PermissionIndex>,
    },
    /// No token is stored, or the stored one was rejected and purged
    Unauthenticated,
    /// The backend could not be reached; the stored token is retained and a
    /// caller-triggered retry may still succeed
    Failed { reason: String },
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// True while the state has not settled into a definite answer yet
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Resolving)
    }

    pub fn profile(&self) -> Option<&Arc<UserProfile>> {
        match self {
            Self::Authenticated { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub fn permissions(&self) -> Option<&Arc<PermissionIndex>> {
        match self {
            Self::Authenticated { permissions, .. } => Some(permissions),
            _ => None,
        }
    }
}
