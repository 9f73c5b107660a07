use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::config::LoginConfig;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+._%\-]{1,256}@[A-Za-z0-9][A-Za-z0-9\-]{0,64}(\.[A-Za-z0-9][A-Za-z0-9\-]{0,25})+$")
        .unwrap_or_else(|e| panic!("email pattern is invalid: {e}"))
});

/// Problem with a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
}

/// Field-level problems, reported together so the form can flag both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFieldErrors {
    pub email: Option<LoginError>,
    pub password: Option<LoginError>,
}

impl LoginFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

/// Why a login attempt was turned down.
///
/// `WrongCredentials` belongs to the whole form, not to a field: both fields
/// passed validation, the pair just isn't the configured account.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginRejection {
    #[error("Fix the highlighted fields")]
    Fields(LoginFieldErrors),
    #[error("Incorrect email or password")]
    WrongCredentials,
}

/// Checks the login form against a fixed pair of credentials.
///
/// This is a gate for the demo account only, not authentication.
#[derive(Debug, Clone)]
pub struct LoginValidator {
    email: String,
    password: String,
    forgot_password_url: String,
}

impl LoginValidator {
    pub fn new(config: &LoginConfig) -> Self {
        Self {
            email: config.email.clone(),
            password: config.password.clone(),
            forgot_password_url: config.forgot_password_url.clone(),
        }
    }

    pub fn validate_fields(&self, email: &str, password: &str) -> LoginFieldErrors {
        LoginFieldErrors {
            email: (!EMAIL_PATTERN.is_match(email)).then_some(LoginError::InvalidEmail),
            password: (password.chars().count() < MIN_PASSWORD_LEN)
                .then_some(LoginError::PasswordTooShort),
        }
    }

    /// Field validation first, then the credential comparison.
    pub fn login(&self, email: &str, password: &str) -> Result<(), LoginRejection> {
        let errors = self.validate_fields(email, password);
        if !errors.is_empty() {
            return Err(LoginRejection::Fields(errors));
        }
        if email == self.email && password == self.password {
            Ok(())
        } else {
            Err(LoginRejection::WrongCredentials)
        }
    }

    pub fn forgot_password_url(&self) -> &str {
        &self.forgot_password_url
    }
}
