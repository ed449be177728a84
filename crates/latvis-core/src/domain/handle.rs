use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable key naming one logical blob.
///
/// The canonical string form is both the storage key and the token that shows up in
/// logs. Two handles with the same string address the same blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Caller-assigned handle, e.g. `Handle::new("job-42")`.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Like `new`, but rejects blank input.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some(Self(value.to_string()))
    }

    /// Content-derived handle: lowercase hex SHA-256 of `bytes`.
    pub fn for_content(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Handle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Handle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn equal_strings_are_equal_handles() {
        assert_eq!(Handle::new("job-42"), Handle::from("job-42".to_string()));
        assert_ne!(Handle::new("job-42"), Handle::new("job-43"));
    }

    #[test]
    fn content_handle_is_deterministic() {
        let a = Handle::for_content(b"result");
        let b = Handle::for_content(b"result");
        let c = Handle::for_content(b"other");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn content_handle_of_empty_input() {
        assert_eq!(
            Handle::for_content(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::spaces("   ")]
    #[case::tab("\t")]
    fn parse_rejects_blank(#[case] input: &str) {
        assert!(Handle::parse(input).is_none());
    }

    #[test]
    fn parse_trims() {
        assert_eq!(Handle::parse("  job-42 ").unwrap().as_str(), "job-42");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Handle::new("job-42")).unwrap();
        assert_eq!(json, "\"job-42\"");
    }
}
