use std::{
    collections::BTreeSet,
    fmt::{Debug, Display},
    ops::Deref,
};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{errors::ConversionError, id::DbId};

use super::UserProfile;

/// Technical name of a permission (for example `feature:view_game_schedule`)
///
/// Validated at the boundary so a typo cannot silently grant or deny access.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    pub const MAX_LENGTH: usize = 100;
}

impl TryFrom<String> for PermissionName {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ConversionError::Empty);
        }
        if value.len() > Self::MAX_LENGTH {
            return Err(ConversionError::MaxExceeded {
                max: Self::MAX_LENGTH,
                actual: value.len(),
            });
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for PermissionName {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.to_string().try_into()
    }
}

impl From<PermissionName> for String {
    fn from(value: PermissionName) -> Self {
        value.0
    }
}

impl Deref for PermissionName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0[..]
    }
}

impl Display for PermissionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A capability as defined by the server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Permission {
    pub id: DbId,
    pub name: PermissionName,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub module_group: Option<String>,
}

/// Flattened fast-lookup set of capability names derived from a profile
///
/// Rebuilt in full on every profile change, never patched incrementally, to
/// avoid stale entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionIndex {
    is_superuser: bool,
    names: BTreeSet<PermissionName>,
}

impl PermissionIndex {
    /// Flattens the union of permission names across all of the profile's
    /// roles
    pub fn build(profile: &UserProfile) -> Self {
        let names = profile
            .roles
            .iter()
            .flat_map(|role| role.permissions.iter())
            .map(|permission| permission.name.clone())
            .collect();
        Self {
            is_superuser: profile.is_superuser,
            names,
        }
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Membership test for a single name, superusers always pass
    pub fn has(&self, name: &PermissionName) -> bool {
        self.has_all(std::slice::from_ref(name))
    }

    /// Conjunctive membership test: true iff ALL `required` names are members
    ///
    /// Superusers pass unconditionally. An empty index denies everything for
    /// non superusers, including an empty requirement list.
    #[instrument(ret)]
    pub fn has_all(&self, required: &[PermissionName]) -> bool {
        if self.is_superuser {
            return true;
        }
        if self.names.is_empty() {
            return false;
        }
        required.iter().all(|name| self.names.contains(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionName> {
        self.names.iter()
    }
}
