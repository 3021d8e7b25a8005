//! This module stores the expected format of the arguments for the requests

use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;

#[derive(Clone)]
pub struct LoginReqArgs {
    /// The backend's login form names this field `username` but the value is
    /// the user's email address
    pub email: String,
    pub password: SecretString,
}

impl LoginReqArgs {
    pub fn new(email: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Pairs for the `application/x-www-form-urlencoded` login request body
    pub fn form_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("username", self.email.clone()),
            ("password", self.password.expose_secret().to_string()),
        ]
    }
}

impl Debug for LoginReqArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginReqArgs")
            .field("email", &self.email)
            .field("has_password", &!self.password.expose_secret().is_empty())
            .finish()
    }
}
