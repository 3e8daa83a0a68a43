//! Principal identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Principal`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    /// The input string is empty.
    #[error("principal cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("principal must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace.
    #[error("principal cannot contain whitespace")]
    Whitespace,
}

/// An opaque token identifying a user to the backend.
///
/// The client never looks inside a principal; it only carries it between
/// backend calls (message threads, event attendees, profile lookups).
///
/// ## Constraints
///
/// - Length: 1-128 characters
/// - No whitespace anywhere
///
/// ## Examples
///
/// ```
/// use fairway_core::Principal;
///
/// assert!(Principal::parse("2vxsx-fae").is_ok());
/// assert!(Principal::parse("").is_err());
/// assert!(Principal::parse("two words").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Maximum length of a textual principal.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `Principal` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 128 characters,
    /// or contains whitespace.
    pub fn parse(s: &str) -> Result<Self, PrincipalError> {
        if s.is_empty() {
            return Err(PrincipalError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(PrincipalError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(PrincipalError::Whitespace);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the principal as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Principal` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
