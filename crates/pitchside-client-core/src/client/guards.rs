//! Pure decision functions gating navigation into protected regions
//!
//! Guards read the session state and nothing else, so callers take a
//! [`SessionState`] snapshot (via [`Client::session_state`]) and decide from
//! that. `Pending` is distinct from `Deny` so a router can show a neutral
//! waiting indication instead of redirecting prematurely.
//!
//! [`Client::session_state`]: crate::Client::session_state

use pitchside_shared::uac::PermissionName;

use super::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Deny,
    /// The answer is not known yet (still resolving, or the backend was
    /// unreachable and a retry is pending)
    Pending,
}

impl GuardOutcome {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Any logged in user may enter
pub fn authenticated_area(session: &SessionState) -> GuardOutcome {
    match session {
        SessionState::Authenticated { .. } => GuardOutcome::Allow,
        SessionState::Unauthenticated => GuardOutcome::Deny,
        SessionState::Uninitialized | SessionState::Resolving | SessionState::Failed { .. } => {
            GuardOutcome::Pending
        }
    }
}

/// Superusers only
pub fn admin_area(session: &SessionState) -> GuardOutcome {
    match session {
        SessionState::Authenticated { profile, .. } => {
            if profile.is_superuser {
                GuardOutcome::Allow
            } else {
                GuardOutcome::Deny
            }
        }
        SessionState::Unauthenticated => GuardOutcome::Deny,
        SessionState::Uninitialized | SessionState::Resolving | SessionState::Failed { .. } => {
            GuardOutcome::Pending
        }
    }
}

/// Requires ALL of `required` (superusers always pass)
pub fn permission_scoped_area(
    session: &SessionState,
    required: &[PermissionName],
) -> GuardOutcome {
    match session {
        SessionState::Authenticated { permissions, .. } => {
            if permissions.has_all(required) {
                GuardOutcome::Allow
            } else {
                GuardOutcome::Deny
            }
        }
        SessionState::Unauthenticated => GuardOutcome::Deny,
        SessionState::Uninitialized | SessionState::Resolving | SessionState::Failed { .. } => {
            GuardOutcome::Pending
        }
    }
}
