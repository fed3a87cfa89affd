//! Field rules shared by registration, user creation and store creation.
//!
//! Each validator returns the cleaned value or the client-facing message.
//! [`ValidationErrors`] collects failures across a whole request body so the
//! caller can report every bad field at once.

use serde::{Deserialize, Serialize};

use crate::types::{Email, Role, StarRating};

pub const NAME_MESSAGE: &str = "Name must be between 5 and 60 characters";
pub const EMAIL_MESSAGE: &str = "Valid email is required";
pub const PASSWORD_MESSAGE: &str =
    "Password must be 8-16 characters with uppercase and special character";
pub const ADDRESS_MESSAGE: &str = "Address cannot exceed 400 characters";
pub const SELF_ROLE_MESSAGE: &str = "Role must be either user or store_owner";
pub const ROLE_MESSAGE: &str = "Role must be one of admin, user or store_owner";
pub const STORE_NAME_MESSAGE: &str = "Store name must be between 5 and 60 characters";
pub const STORE_EMAIL_MESSAGE: &str = "Valid store email is required";
pub const RATING_MESSAGE: &str = "rating must be between 1 and 5";

const NAME_LEN: std::ops::RangeInclusive<usize> = 5..=60;
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 8..=16;
const ADDRESS_MAX: usize = 400;
const PASSWORD_SPECIALS: &str = "!@#$%^&*";

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Request body field name, as the client sent it.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All field failures for one request body.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[error("validation failed for {} field(s)", .0.len())]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// Record the outcome of one validator, returning the value on success.
    pub fn check<T>(&mut self, field: &str, result: Result<T, &str>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.0.push(FieldError::new(field, message));
                None
            }
        }
    }

    /// Add a failure directly.
    pub fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError::new(field, message));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing failed.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one field failed.
    pub fn finish(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Messages in the order they were recorded.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.message.as_str())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Person name: 5-60 characters after trimming.
///
/// # Errors
///
/// Returns [`NAME_MESSAGE`] when the length is out of range.
pub fn validate_user_name(raw: &str) -> Result<String, &'static str> {
    let name = raw.trim();
    if NAME_LEN.contains(&char_len(name)) {
        Ok(name.to_owned())
    } else {
        Err(NAME_MESSAGE)
    }
}

/// Account email, normalized to lowercase.
///
/// # Errors
///
/// Returns [`EMAIL_MESSAGE`] when the address does not parse.
pub fn validate_email(raw: &str) -> Result<Email, &'static str> {
    Email::parse(raw).map_err(|_| EMAIL_MESSAGE)
}

/// Store contact email, normalized to lowercase.
///
/// # Errors
///
/// Returns [`STORE_EMAIL_MESSAGE`] when the address does not parse.
pub fn validate_store_email(raw: &str) -> Result<Email, &'static str> {
    Email::parse(raw).map_err(|_| STORE_EMAIL_MESSAGE)
}

/// Password: 8-16 characters with an uppercase letter and one of `!@#$%^&*`.
///
/// Not trimmed; surrounding whitespace is part of the secret.
///
/// # Errors
///
/// Returns [`PASSWORD_MESSAGE`] when any rule fails.
pub fn validate_password(raw: &str) -> Result<(), &'static str> {
    let ok = PASSWORD_LEN.contains(&char_len(raw))
        && raw.chars().any(char::is_uppercase)
        && raw.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if ok { Ok(()) } else { Err(PASSWORD_MESSAGE) }
}

/// Optional address: at most 400 characters. Blank becomes `None`.
///
/// # Errors
///
/// Returns [`ADDRESS_MESSAGE`] when too long.
pub fn validate_address(raw: Option<&str>) -> Result<Option<String>, &'static str> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(address) if char_len(address) <= ADDRESS_MAX => Ok(Some(address.to_owned())),
        Some(_) => Err(ADDRESS_MESSAGE),
    }
}

/// Store address: at most 400 characters, may be empty.
///
/// # Errors
///
/// Returns [`ADDRESS_MESSAGE`] when too long.
pub fn validate_store_address(raw: &str) -> Result<String, &'static str> {
    let address = raw.trim();
    if char_len(address) <= ADDRESS_MAX {
        Ok(address.to_owned())
    } else {
        Err(ADDRESS_MESSAGE)
    }
}

/// Store name: 5-60 characters after trimming.
///
/// # Errors
///
/// Returns [`STORE_NAME_MESSAGE`] when the length is out of range.
pub fn validate_store_name(raw: &str) -> Result<String, &'static str> {
    let name = raw.trim();
    if NAME_LEN.contains(&char_len(name)) {
        Ok(name.to_owned())
    } else {
        Err(STORE_NAME_MESSAGE)
    }
}

/// Role picked at self-registration. Absent means [`Role::User`].
///
/// # Errors
///
/// Returns [`SELF_ROLE_MESSAGE`] for `admin` or an unknown role.
pub fn validate_self_role(raw: Option<&str>) -> Result<Role, &'static str> {
    match raw {
        None => Ok(Role::User),
        Some(s) => s
            .parse::<Role>()
            .ok()
            .filter(Role::is_self_assignable)
            .ok_or(SELF_ROLE_MESSAGE),
    }
}

/// Any role, as assigned by an administrator. Absent means [`Role::User`].
///
/// # Errors
///
/// Returns [`ROLE_MESSAGE`] for an unknown role.
pub fn validate_role(raw: Option<&str>) -> Result<Role, &'static str> {
    raw.map_or(Ok(Role::User), |s| s.parse().map_err(|_| ROLE_MESSAGE))
}

/// Star rating in `1..=5`.
///
/// # Errors
///
/// Returns [`RATING_MESSAGE`] when out of range.
pub fn validate_rating(raw: i64) -> Result<StarRating, &'static str> {
    StarRating::new(raw).map_err(|_| RATING_MESSAGE)
}
