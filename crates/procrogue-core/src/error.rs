//! Error types for the core crate.

use std::error::Error;
use std::fmt;

/// A settings token or value could not be interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingError {
    /// The class token matches no known starting class.
    UnknownClass {
        /// The token as given.
        token: String,
    },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownClass { token } => write!(f, "unknown player class '{token}'"),
        }
    }
}

impl Error for SettingError {}
