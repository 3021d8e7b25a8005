//! User access control types: profiles, roles and permissions

mod permissions;
mod role;
mod user;

pub use permissions::{Permission, PermissionIndex, PermissionName};
pub use role::{Role, RoleDisplayName, RoleName};
pub use user::{EmailAddress, UserId, UserProfile};

pub(crate) fn default_true() -> bool {
    true
}
