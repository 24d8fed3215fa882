//! Sandbox identifiers
//!
//! A sandbox id is either a GUID (stored as 32 lowercase hex digits without
//! dashes) or a pre-production id of the form `p-` followed by thirty
//! alphanumeric characters (stored lowercase). An unset id is allowed.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

static PRE_PRODUCTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^p-[a-zA-Z0-9]{30}$").expect("sandbox pattern is valid"));

/// Error for input that is neither a GUID nor a pre-production sandbox id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid sandbox id '{input}': must be GUID-parseable, or start with 'p-' followed by thirty letters or digits")]
pub struct SandboxIdError {
    pub input: String,
}

/// Normalized sandbox identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SandboxId(Option<String>);

impl SandboxId {
    /// The unset sandbox id
    pub const fn unset() -> Self {
        Self(None)
    }

    /// Validate and normalize. `None` is accepted as-is.
    pub fn new(value: Option<&str>) -> Result<Self, SandboxIdError> {
        value.map_or(Ok(Self(None)), Self::parse)
    }

    /// Validate and normalize a present value
    pub fn parse(value: &str) -> Result<Self, SandboxIdError> {
        if let Ok(guid) = Uuid::parse_str(value) {
            return Ok(Self(Some(guid.simple().to_string())));
        }

        if PRE_PRODUCTION_PATTERN.is_match(value) {
            return Ok(Self(Some(value.to_lowercase())));
        }

        Err(SandboxIdError {
            input: value.to_string(),
        })
    }

    /// Replace the value, leaving it unchanged on error
    pub fn set(&mut self, value: Option<&str>) -> Result<(), SandboxIdError> {
        *self = Self::new(value)?;
        Ok(())
    }

    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// True if unset, empty, or the all-zero GUID
    pub fn is_empty(&self) -> bool {
        match self.0.as_deref() {
            None | Some("") => true,
            Some(value) => value == Uuid::nil().simple().to_string(),
        }
    }

    /// True for ids of the `p-...` form
    pub fn is_pre_production(&self) -> bool {
        self.0.as_deref().is_some_and(|v| v.starts_with("p-"))
    }
}

impl FromStr for SandboxId {
    type Err = SandboxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SandboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_deref().unwrap_or(""))
    }
}

#[derive(Serialize, Deserialize)]
struct SandboxIdRepr {
    #[serde(rename = "Value", default)]
    value: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SandboxIdInput {
    Bare(Option<String>),
    Wrapped(SandboxIdRepr),
}

impl Serialize for SandboxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SandboxIdRepr {
            value: self.0.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SandboxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = match SandboxIdInput::deserialize(deserializer)? {
            SandboxIdInput::Bare(value) => value,
            SandboxIdInput::Wrapped(repr) => repr.value,
        };
        Self::new(value.as_deref()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRE_PROD: &str = "p-ABCDEFGHIJKLMNOPQRSTUVWXYZ0123";

    #[test]
    fn test_guid_is_stripped_and_lowercased() {
        let id = SandboxId::parse("550E8400-E29B-41D4-A716-446655440000").unwrap();
        assert_eq!(id.value(), Some("550e8400e29b41d4a716446655440000"));
        assert!(!id.is_empty());
    }

    #[test]
    fn test_simple_guid_accepted() {
        let id = SandboxId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(id.to_string(), "550e8400e29b41d4a716446655440000");
    }

    #[test]
    fn test_pre_production_id_lowercased() {
        assert_eq!(PRE_PROD.len(), 32);
        let id = SandboxId::parse(PRE_PROD).unwrap();
        assert_eq!(id.value(), Some(PRE_PROD.to_lowercase().as_str()));
        assert!(id.is_pre_production());
    }

    #[test]
    fn test_pre_production_wrong_length_rejected() {
        let short = &PRE_PROD[..31];
        assert!(SandboxId::parse(short).is_err());
        let long = format!("{}4", PRE_PROD);
        assert!(SandboxId::parse(&long).is_err());
    }

    #[test]
    fn test_garbage_rejected_with_input() {
        let err = SandboxId::parse("not-a-sandbox").unwrap_err();
        assert_eq!(err.input, "not-a-sandbox");
        assert!(err.to_string().contains("GUID"));
    }

    #[test]
    fn test_none_accepted_and_empty() {
        let id = SandboxId::new(None).unwrap();
        assert_eq!(id.value(), None);
        assert!(id.is_empty());
    }

    #[test]
    fn test_zero_guid_is_empty() {
        let id = SandboxId::parse("00000000-0000-0000-0000-000000000000").unwrap();
        assert!(id.is_empty());
    }

    #[test]
    fn test_set_keeps_value_on_error() {
        let mut id = SandboxId::parse(PRE_PROD).unwrap();
        assert!(id.set(Some("bogus")).is_err());
        assert!(id.is_pre_production());
        id.set(None).unwrap();
        assert!(id.is_empty());
    }

    #[test]
    fn test_equality_on_normalized_value() {
        let a = SandboxId::parse("550E8400-E29B-41D4-A716-446655440000").unwrap();
        let b = SandboxId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_forms() {
        let id = SandboxId::parse(PRE_PROD).unwrap();
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json, serde_json::json!({"Value": PRE_PROD.to_lowercase()}));

        let wrapped: SandboxId = serde_json::from_value(json).unwrap();
        assert_eq!(wrapped, id);

        let bare: SandboxId = serde_json::from_str(&format!("\"{}\"", PRE_PROD)).unwrap();
        assert_eq!(bare, id);

        let unset: SandboxId = serde_json::from_str(r#"{"Value": null}"#).unwrap();
        assert!(unset.is_empty());

        assert!(serde_json::from_str::<SandboxId>(r#"{"Value": "nope"}"#).is_err());
    }
}
