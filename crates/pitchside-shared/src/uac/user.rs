use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ConversionError;

use super::{default_true, Role};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(Uuid);

impl UserId {
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Constrained to be non-empty and contain an `@`
///
/// Full address validation is the server's job, this only catches values that
/// cannot possibly be an email.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub const MAX_LENGTH: usize = 320;
}

impl TryFrom<String> for EmailAddress {
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
        if !value.contains('@') {
            return Err(ConversionError::Invalid {
                reason: "expected an '@' in an email address",
            });
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.to_string().try_into()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved identity and role assignment for the current token
///
/// Replaced wholesale on every successful resolution.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: EmailAddress,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserProfile {
    /// Name to show in the UI, falls back to the email
    pub fn display_label(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.email.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::empty("", ConversionError::Empty)]
    #[case::no_at_sign(
        "not-an-email",
        ConversionError::Invalid {
            reason: "expected an '@' in an email address"
        }
    )]
    fn illegal_email_addresses(#[case] value: &str, #[case] expected: ConversionError) {
        let actual: Result<EmailAddress, ConversionError> = value.try_into();
        assert_eq!(actual.unwrap_err(), expected);
    }

    #[test]
    fn profile_deserializes_backend_shape() {
        let raw = r#"{
            "id": "8f2fb9b0-51b4-4c6a-9d6a-64f58c44a3d5",
            "email": "a@b.com",
            "full_name": "Ana B",
            "is_active": true,
            "is_superuser": false,
            "roles": [{
                "id": 1,
                "name": "plan_starter",
                "display_name": "+EV Starter",
                "permissions": [{"id": 7, "name": "feature:view_game_schedule"}]
            }]
        }"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.display_label(), "Ana B");
        assert_eq!(profile.roles.len(), 1);
        assert_eq!(profile.roles[0].permissions.len(), 1);
    }

    #[test]
    fn display_label_falls_back_to_email() {
        let profile = UserProfile {
            id: UserId::nil(),
            email: "a@b.com".try_into().unwrap(),
            full_name: None,
            is_active: true,
            is_superuser: false,
            roles: vec![],
        };
        assert_eq!(profile.display_label(), "a@b.com");
    }
}
