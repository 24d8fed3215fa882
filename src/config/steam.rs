//! Steam integration settings: `eos_steam_config.json`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use super::{Config, ConfigFile, CURRENT_SCHEMA_VERSION};
use crate::core::flags::IntegratedPlatformManagementFlags;
use crate::core::{nullable, Version};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SteamConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<Version>,

    pub integrated_platform_management_flags: IntegratedPlatformManagementFlags,

    /// Steam API library to load instead of the bundled one
    pub override_library_path: Option<String>,

    #[serde(rename = "steamSDKMajorVersion")]
    pub steam_sdk_major_version: u32,

    #[serde(rename = "steamSDKMinorVersion")]
    pub steam_sdk_minor_version: u32,

    pub steam_api_interface_versions_array: Vec<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SteamConfigRepr {
    schema_version: Option<Version>,

    integrated_platform_management_flags: Option<IntegratedPlatformManagementFlags>,

    /// Key used by older editors, read only when the current key is absent
    flags: Option<IntegratedPlatformManagementFlags>,

    #[serde(deserialize_with = "deserialize_library_path")]
    override_library_path: Option<String>,

    #[serde(rename = "steamSDKMajorVersion")]
    steam_sdk_major_version: u32,

    #[serde(rename = "steamSDKMinorVersion")]
    steam_sdk_minor_version: u32,

    #[serde(deserialize_with = "nullable::deserialize")]
    steam_api_interface_versions_array: Vec<String>,
}

impl From<SteamConfigRepr> for SteamConfig {
    fn from(repr: SteamConfigRepr) -> Self {
        Self {
            schema_version: repr.schema_version,
            integrated_platform_management_flags: repr
                .integrated_platform_management_flags
                .or(repr.flags)
                .unwrap_or_default(),
            override_library_path: repr.override_library_path,
            steam_sdk_major_version: repr.steam_sdk_major_version,
            steam_sdk_minor_version: repr.steam_sdk_minor_version,
            steam_api_interface_versions_array: repr.steam_api_interface_versions_array,
        }
    }
}

impl<'de> Deserialize<'de> for SteamConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        SteamConfigRepr::deserialize(deserializer).map(Self::from)
    }
}

impl SteamConfig {
    pub fn new() -> Self {
        Self {
            schema_version: Some(CURRENT_SCHEMA_VERSION),
            ..Self::default()
        }
    }

    pub fn is_managed_by_application(&self) -> bool {
        self.integrated_platform_management_flags
            .contains(IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_APPLICATION)
    }

    pub fn is_managed_by_sdk(&self) -> bool {
        self.integrated_platform_management_flags
            .contains(IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_SDK)
    }

    /// Interface versions as the SDK wants them: each entry NUL-terminated,
    /// with one more NUL closing the list.
    pub fn interface_versions_block(&self) -> Vec<u8> {
        let mut block = Vec::new();
        for version in &self.steam_api_interface_versions_array {
            block.extend_from_slice(version.as_bytes());
            block.push(0);
        }
        block.push(0);
        block
    }

    /// The override library if it exists, otherwise `default` if that exists
    pub fn library_path(&self, default: &Path) -> Option<PathBuf> {
        self.override_library_path
            .as_deref()
            .map(Path::new)
            .filter(|path| path.exists())
            .or_else(|| Some(default).filter(|path| path.exists()))
            .map(Path::to_path_buf)
    }
}

impl Config for SteamConfig {
    fn schema_version(&self) -> Option<Version> {
        self.schema_version
    }

    fn set_schema_version(&mut self, version: Version) {
        self.schema_version = Some(version);
    }
}

impl ConfigFile for SteamConfig {
    const FILE_NAME: &'static str = "eos_steam_config.json";
}

/// Older editors wrote the string "null" for an unset path
fn deserialize_library_path<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|path| {
        let path = path.trim();
        !path.is_empty() && !path.eq_ignore_ascii_case("null")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_legacy_flags_key_accepted() {
        let config: SteamConfig =
            serde_json::from_str(r#"{"flags": ["EOS_IPMF_LibraryManagedByApplication"]}"#).unwrap();
        assert!(config.is_managed_by_application());
        assert!(!config.is_managed_by_sdk());

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json["integratedPlatformManagementFlags"],
            serde_json::json!(["LibraryManagedByApplication"])
        );
        assert!(json.get("flags").is_none());
    }

    #[test]
    fn test_current_flags_key_wins_over_legacy_key() {
        let config: SteamConfig = serde_json::from_str(
            r#"{"flags": ["LibraryManagedBySDK"], "integratedPlatformManagementFlags": ["LibraryManagedByApplication"]}"#,
        )
        .unwrap();
        assert!(config.is_managed_by_application());
        assert!(!config.is_managed_by_sdk());
    }

    #[test]
    fn test_null_interface_versions_read_as_empty() {
        let config: SteamConfig =
            serde_json::from_str(r#"{"steamApiInterfaceVersionsArray": null, "steamSDKMajorVersion": 1}"#).unwrap();
        assert!(config.steam_api_interface_versions_array.is_empty());
        assert_eq!(config.steam_sdk_major_version, 1);
    }

    #[test]
    fn test_sdk_version_keys() {
        let config: SteamConfig = serde_json::from_str(
            r#"{"steamSDKMajorVersion": 1, "steamSDKMinorVersion": 57, "steamApiInterfaceVersionsArray": ["SteamUser021"]}"#,
        )
        .unwrap();
        assert_eq!(config.steam_sdk_major_version, 1);
        assert_eq!(config.steam_sdk_minor_version, 57);
        assert_eq!(config.steam_api_interface_versions_array, vec!["SteamUser021"]);
    }

    #[test]
    fn test_null_string_path_is_unset() {
        for raw in [r#""null""#, r#""NULL""#, r#""""#, "null"] {
            let json = format!(r#"{{"overrideLibraryPath": {}}}"#, raw);
            let config: SteamConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(config.override_library_path, None, "input {}", raw);
        }
    }

    #[test]
    fn test_interface_versions_block() {
        let config = SteamConfig {
            steam_api_interface_versions_array: vec!["A1".to_string(), "B2".to_string()],
            ..SteamConfig::new()
        };
        assert_eq!(config.interface_versions_block(), b"A1\0B2\0\0".to_vec());
        assert_eq!(SteamConfig::new().interface_versions_block(), vec![0]);
    }

    #[test]
    fn test_library_path_prefers_existing_override() {
        let tmp = TempDir::new().unwrap();
        let default = tmp.path().join("steam_api64.dll");
        let custom = tmp.path().join("custom.dll");
        std::fs::write(&default, b"").unwrap();

        let mut config = SteamConfig::new();
        config.override_library_path = Some(custom.to_string_lossy().into_owned());
        assert_eq!(config.library_path(&default), Some(default.clone()));

        std::fs::write(&custom, b"").unwrap();
        assert_eq!(config.library_path(&default), Some(custom));

        let missing = tmp.path().join("missing.dll");
        assert_eq!(SteamConfig::new().library_path(&missing), None);
    }
}
