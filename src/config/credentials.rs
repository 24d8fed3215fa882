//! Client credentials as defined in the Epic Developer Portal

use serde::{Deserialize, Serialize};

use crate::core::nullable;

/// Client id and secret with the key used to encrypt player data storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientCredentials {
    #[serde(rename = "ClientId", default, deserialize_with = "nullable::deserialize")]
    pub client_id: String,

    #[serde(rename = "ClientSecret", default, deserialize_with = "nullable::deserialize")]
    pub client_secret: String,

    #[serde(rename = "EncryptionKey", default, deserialize_with = "nullable::deserialize")]
    pub encryption_key: String,
}

impl ClientCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        encryption_key: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            encryption_key: encryption_key.into(),
        }
    }

    /// Both id and secret are filled in
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.client_id.is_empty() && self.client_secret.is_empty() && self.encryption_key.is_empty()
    }

    /// The SDK expects exactly 64 hexadecimal characters
    pub fn is_encryption_key_valid(&self) -> bool {
        is_valid_encryption_key(&self.encryption_key)
    }
}

pub fn is_valid_encryption_key(key: &str) -> bool {
    key.len() == 64 && key.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_key_validation() {
        let key = "a".repeat(64);
        assert!(ClientCredentials::new("id", "secret", key).is_encryption_key_valid());
        assert!(!ClientCredentials::new("id", "secret", "a".repeat(63)).is_encryption_key_valid());
        assert!(!ClientCredentials::new("id", "secret", "g".repeat(64)).is_encryption_key_valid());
        assert!(!ClientCredentials::default().is_encryption_key_valid());
    }

    #[test]
    fn test_is_complete() {
        assert!(ClientCredentials::new("id", "secret", "").is_complete());
        assert!(!ClientCredentials::new("id", " ", "").is_complete());
        assert!(ClientCredentials::default().is_empty());
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let creds: ClientCredentials = serde_json::from_str(
            r#"{"ClientId": "xyz", "ClientSecret": null, "EncryptionKey": null}"#,
        )
        .unwrap();
        assert_eq!(creds, ClientCredentials::new("xyz", "", ""));
    }

    #[test]
    fn test_json_keys() {
        let creds = ClientCredentials::new("xyz", "s3cret", "");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ClientId": "xyz", "ClientSecret": "s3cret", "EncryptionKey": ""})
        );
    }
}
