//! Backend record identifiers.
//!
//! The backend addresses every record through an opaque `_id` string. Entities receive a
//! hyphenated UUID v4 when created client-side; document identifiers are whatever the upload
//! pipeline assigned (often the stored filename), so parsing only enforces the shape rules
//! every `_id` shares:
//!
//! - non-empty
//! - no whitespace
//! - at most [`MAX_ID_LEN`] bytes
//!
//! Identifiers are compared byte-for-byte. No normalisation is applied.

use std::fmt;
use std::str::FromStr;

/// Upper bound on identifier length, in bytes.
pub const MAX_ID_LEN: usize = 128;

/// Error type for identifier parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn validate(kind: &str, input: &str) -> Result<(), IdError> {
    if input.is_empty() {
        return Err(IdError::InvalidInput(format!("{kind} cannot be empty")));
    }
    if input.len() > MAX_ID_LEN {
        return Err(IdError::InvalidInput(format!(
            "{kind} exceeds {MAX_ID_LEN} bytes"
        )));
    }
    if input.chars().any(char::is_whitespace) {
        return Err(IdError::InvalidInput(format!(
            "{kind} must not contain whitespace, got: '{input}'"
        )));
    }
    Ok(())
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Validates an externally supplied identifier.
            ///
            /// # Errors
            ///
            /// Returns [`IdError::InvalidInput`] if `input` is empty, too long, or contains
            /// whitespace.
            pub fn parse(input: &str) -> Result<Self, IdError> {
                validate($kind, input)?;
                Ok(Self(input.to_owned()))
            }

            /// Allocates a fresh identifier (hyphenated lowercase UUID v4).
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().hyphenated().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

record_id!(
    /// Identifier of a document-owning entity (action, consultation, treatment, person).
    EntityId,
    "entity id"
);

record_id!(
    /// Identifier of a single uploaded document or folder.
    DocumentId,
    "document id"
);
