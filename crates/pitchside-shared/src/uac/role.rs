use std::{fmt::Display, ops::Deref};

use serde::{Deserialize, Serialize};

use crate::{errors::ConversionError, id::DbId};

use super::{default_true, Permission};

/// A role (called a "plan" on the product side) grouping a set of permissions
///
/// Fetched as part of profile resolution and never mutated client-side.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: DbId,
    pub name: RoleName,
    pub display_name: RoleDisplayName,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Technical, unique role name (for example `plan_starter`)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    pub const MAX_LENGTH: usize = 50;
}

/// User facing role name (for example `+EV Starter`)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct RoleDisplayName(String);

impl RoleDisplayName {
    pub const MAX_LENGTH: usize = 100;
}

impl TryFrom<String> for RoleName {
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

impl TryFrom<&str> for RoleName {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.to_string().try_into()
    }
}

impl TryFrom<String> for RoleDisplayName {
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

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl From<RoleDisplayName> for String {
    fn from(value: RoleDisplayName) -> Self {
        value.0
    }
}

impl Deref for RoleName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0[..]
    }
}

impl Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for RoleDisplayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::empty("", ConversionError::Empty)]
    #[case::too_long(&"a".repeat(51), ConversionError::MaxExceeded { max: 50, actual: 51 })]
    fn illegal_role_names(#[case] name: &str, #[case] expected: ConversionError) {
        // Act
        let actual: Result<RoleName, ConversionError> = name.try_into();

        // Assert
        assert_eq!(actual.unwrap_err(), expected);
    }

    #[test]
    fn illegal_role_display_name() {
        // Act
        let actual: Result<RoleDisplayName, ConversionError> = "a".repeat(101).try_into();

        // Assert
        assert_eq!(
            actual.unwrap_err(),
            ConversionError::MaxExceeded {
                max: 100,
                actual: 101
            }
        );
    }

    #[test]
    fn role_deserializes_without_optional_fields() {
        let raw = r#"{"id": 3, "name": "plan_starter", "display_name": "+EV Starter"}"#;
        let role: Role = serde_json::from_str(raw).unwrap();
        assert_eq!(role.id, 3.into());
        assert!(role.is_active);
        assert!(role.permissions.is_empty());
    }
}
