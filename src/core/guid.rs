//! GUID formatting and lenient JSON conversion
//!
//! Config files store GUIDs as 32 lowercase hex digits. Reading is forgiving:
//! hyphenated GUIDs are accepted, null or empty strings give the nil GUID, and
//! anything unparsable becomes the nil GUID with a warning. Use with
//! `#[serde(with = "crate::core::guid")]`.

use serde::{Deserialize, Deserializer, Serializer};
use uuid::Uuid;

/// Lowercase, dash-free representation of a GUID
pub fn to_stripped_string(guid: &Uuid) -> String {
    guid.simple().to_string()
}

/// Parse a GUID the way config files are read
pub fn parse_lenient(value: &str) -> Uuid {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Uuid::nil();
    }

    match Uuid::parse_str(trimmed) {
        Ok(guid) => guid,
        Err(e) => {
            tracing::warn!(value = %trimmed, error = %e, "Could not parse GUID, using nil GUID");
            Uuid::nil()
        }
    }
}

pub fn serialize<S: Serializer>(guid: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_stripped_string(guid))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.as_deref().map_or_else(Uuid::nil, parse_lenient))
}
