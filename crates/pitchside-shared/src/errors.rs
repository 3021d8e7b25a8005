use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Empty not allowed")]
    Empty,
    #[error("Maximum length exceeded. {max} allowed but found {actual}")]
    MaxExceeded { max: usize, actual: usize },
    #[error("Invalid value: {reason}")]
    Invalid { reason: &'static str },
}

/// Failure of the credential exchange (login with email and password)
///
/// `InvalidCredentials` leaves the session state untouched so the user can
/// correct their input and try again
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("email or password rejected by the server")]
    InvalidCredentials,
    #[error("unable to reach the server: {0}")]
    Unreachable(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Failure to resolve a stored token into a user profile
///
/// `InvalidCredential` means the token itself was rejected (expired, revoked
/// or malformed) and must be purged. `Unreachable` means the outcome is
/// unknown so the token is retained for a later retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("stored credential rejected by the server")]
    InvalidCredential,
    #[error("unable to reach the server: {0}")]
    Unreachable(String),
}
