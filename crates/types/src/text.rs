use std::fmt;
use std::str::FromStr;

/// Longest name accepted for a document or folder, in characters.
pub const MAX_NAME_CHARS: usize = 255;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    #[error("Text cannot be empty")]
    Empty,
    #[error("Text exceeds {MAX_NAME_CHARS} characters")]
    TooLong,
    #[error("Text contains a control character at position {0}")]
    ControlCharacter(usize),
}

/// A display name: trimmed, non-empty, single line.
///
/// Names are shown in file listings and used as download file names, so a rename to
/// `"  scan.pdf "` is stored as `"scan.pdf"` and line breaks or tabs are refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// # Errors
    ///
    /// Returns [`TextError`] if the trimmed input is empty, longer than [`MAX_NAME_CHARS`]
    /// or contains a control character.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if let Some(position) = trimmed.chars().position(char::is_control) {
            return Err(TextError::ControlCharacter(position));
        }
        if trimmed.chars().count() > MAX_NAME_CHARS {
            return Err(TextError::TooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_whitespace() {
        let text = NonEmptyText::new("  Compte rendu  ").unwrap();
        assert_eq!(text.as_str(), "Compte rendu");
    }

    #[test]
    fn test_new_rejects_blank() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
    }

    #[test]
    fn test_new_rejects_line_breaks() {
        assert_eq!(
            NonEmptyText::new("devis\nsigné.pdf"),
            Err(TextError::ControlCharacter(5))
        );
    }

    #[test]
    fn test_new_limits_length_in_characters() {
        let at_limit = "é".repeat(MAX_NAME_CHARS);
        assert!(NonEmptyText::new(&at_limit).is_ok());
        assert_eq!(
            NonEmptyText::new(format!("{at_limit}x")),
            Err(TextError::TooLong)
        );
    }

    #[test]
    fn test_deserialize_rejects_blank() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_as_plain_string() {
        let text = NonEmptyText::new("ordonnance").unwrap();
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"ordonnance\"");
    }
}
