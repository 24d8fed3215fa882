//! Reading and writing config documents in the plugin's config directory

use std::path::{Path, PathBuf};

use super::legacy::{LegacyConfig, MigrationReport};
use super::platform::{Platform, PlatformConfig};
use super::product::ProductConfig;
use super::steam::SteamConfig;
use super::{Config, ConfigError, ConfigFile, CURRENT_SCHEMA_VERSION};
use crate::json::{parse_json_file, to_json_pretty};

/// Where the plugin keeps its config files, relative to a project root, in
/// the order they are tried
pub const CONFIG_DIR_CANDIDATES: &[&str] = &["Assets/StreamingAssets/EOS", "StreamingAssets/EOS", "."];

/// A directory of config documents
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use `dir` if given, otherwise search from the current directory
    pub fn resolve(dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        match dir {
            Some(dir) => Ok(Self::new(dir)),
            None => {
                let cwd = std::env::current_dir().map_err(|_| ConfigError::NoConfigDir)?;
                Self::discover(&cwd)
            }
        }
    }

    /// Find the config directory under `root`.
    ///
    /// A candidate holding a product or legacy config wins. Failing that the
    /// first candidate directory that exists is used, so `init` in a fresh
    /// project writes where the plugin will look.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        if !root.is_dir() {
            return Err(ConfigError::NoConfigDir);
        }

        let candidates: Vec<PathBuf> = CONFIG_DIR_CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .collect();

        let populated = candidates.iter().find(|dir| {
            dir.join(ProductConfig::FILE_NAME).is_file() || dir.join(LegacyConfig::FILE_NAME).is_file()
        });

        let dir = populated
            .or_else(|| candidates.iter().find(|dir| dir.is_dir()))
            .ok_or(ConfigError::NoConfigDir)?;

        tracing::debug!(dir = %dir.display(), "Using config directory");
        Ok(Self::new(dir.clone()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.path_for(file_name).is_file()
    }

    /// Load a document, failing if the file is missing
    pub fn load<T: Config>(&self, file_name: &str) -> Result<T, ConfigError> {
        let path = self.path_for(file_name);
        if !path.is_file() {
            return Err(ConfigError::NotFound { path });
        }

        tracing::debug!(path = %path.display(), "Loading config");
        let mut config: T = parse_json_file(&path)?;
        config.after_load();
        Ok(config)
    }

    /// Load a document, or build one with `default` if the file is missing
    pub fn load_or_else<T: Config>(
        &self,
        file_name: &str,
        default: impl FnOnce() -> T,
    ) -> Result<T, ConfigError> {
        if self.exists(file_name) {
            self.load(file_name)
        } else {
            Ok(default())
        }
    }

    /// Write a document as pretty JSON, creating the directory if needed
    pub fn save<T: Config>(&self, file_name: &str, config: &T) -> Result<PathBuf, ConfigError> {
        let path = self.path_for(file_name);
        let content = to_json_pretty(config).map_err(|source| ConfigError::Serialize {
            file: file_name.to_string(),
            source,
        })?;

        std::fs::create_dir_all(&self.dir).map_err(|source| ConfigError::Write {
            path: self.dir.clone(),
            source,
        })?;
        std::fs::write(&path, content).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Saved config");
        Ok(path)
    }

    pub fn load_file<T: ConfigFile>(&self) -> Result<T, ConfigError> {
        self.load(T::FILE_NAME)
    }

    pub fn save_file<T: ConfigFile>(&self, config: &T) -> Result<PathBuf, ConfigError> {
        self.save(T::FILE_NAME, config)
    }

    /// The product config exactly as stored
    pub fn load_product_config(&self) -> Result<ProductConfig, ConfigError> {
        self.load_file()
    }

    /// The product config, brought up to date in memory.
    ///
    /// When the stored document needs migration and a legacy file exists, the
    /// legacy file is imported and its report returned. Without a legacy file
    /// the document is simply stamped as current. A missing product config is
    /// built from the legacy file alone. Nothing is written; callers save.
    pub fn load_migrated_product_config(
        &self,
    ) -> Result<(ProductConfig, Option<MigrationReport>), ConfigError> {
        let has_product = self.exists(ProductConfig::FILE_NAME);
        let has_legacy = self.exists(LegacyConfig::FILE_NAME);

        if !has_product && !has_legacy {
            return Err(ConfigError::NotFound {
                path: self.path_for(ProductConfig::FILE_NAME),
            });
        }

        let mut config = if has_product {
            self.load_product_config()?
        } else {
            ProductConfig::default()
        };

        if !config.needs_migration() {
            return Ok((config, None));
        }

        if has_legacy {
            let legacy: LegacyConfig = self.load_file()?;
            tracing::info!("Importing {}", LegacyConfig::FILE_NAME);
            let report = config.migrate_from(&legacy);
            return Ok((config, Some(report)));
        }

        config.imported = true;
        config.set_schema_version(CURRENT_SCHEMA_VERSION);
        Ok((config, None))
    }

    pub fn load_platform_config(&self, platform: Platform) -> Result<PlatformConfig, ConfigError> {
        self.load(&platform.file_name())
    }

    pub fn save_platform_config(
        &self,
        platform: Platform,
        config: &PlatformConfig,
    ) -> Result<PathBuf, ConfigError> {
        self.save(&platform.file_name(), config)
    }

    /// The Steam config, or an empty one if the product does not use Steam
    pub fn load_steam_config(&self) -> Result<SteamConfig, ConfigError> {
        self.load_or_else(SteamConfig::FILE_NAME, SteamConfig::default)
    }

    /// Every platform config present in the directory
    pub fn platform_configs(&self) -> Result<Vec<(Platform, PlatformConfig)>, ConfigError> {
        let mut configs = Vec::new();
        for platform in Platform::all() {
            if self.exists(&platform.file_name()) {
                configs.push((*platform, self.load_platform_config(*platform)?));
            }
        }
        Ok(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientCredentials;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_discover_prefers_populated_candidate() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("Assets/StreamingAssets/EOS")).unwrap();
        write(
            &tmp.path().join("StreamingAssets/EOS"),
            ProductConfig::FILE_NAME,
            "{}",
        );

        let store = ConfigStore::discover(tmp.path()).unwrap();
        assert_eq!(store.dir(), tmp.path().join("StreamingAssets/EOS"));
    }

    #[test]
    fn test_discover_falls_back_to_existing_dir() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("Assets/StreamingAssets/EOS")).unwrap();

        let store = ConfigStore::discover(tmp.path()).unwrap();
        assert_eq!(store.dir(), tmp.path().join("Assets/StreamingAssets/EOS"));

        let bare = TempDir::new().unwrap();
        let store = ConfigStore::discover(bare.path()).unwrap();
        assert_eq!(store.dir(), bare.path().join("."));
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("nested"));

        let mut config = ProductConfig::new();
        config.product_name = "Game".to_string();
        config.clients.add(ClientCredentials::new("id", "secret", ""));
        let path = store.save_file(&config).unwrap();

        assert!(path.ends_with(ProductConfig::FILE_NAME));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));

        let back = store.load_product_config().unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path());
        assert!(matches!(
            store.load_product_config(),
            Err(ConfigError::NotFound { .. })
        ));
        assert!(matches!(
            store.load_migrated_product_config(),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), ProductConfig::FILE_NAME, "{ \"ProductName\": }");
        let store = ConfigStore::new(tmp.path());
        assert!(matches!(store.load_product_config(), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_legacy_only_directory_migrates() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            LegacyConfig::FILE_NAME,
            r#"{"productName": "Old Game", "clientID": "id", "clientSecret": "secret"}"#,
        );
        let store = ConfigStore::new(tmp.path());

        let (config, report) = store.load_migrated_product_config().unwrap();
        let report = report.unwrap();
        assert_eq!(report.clients_imported, 1);
        assert_eq!(config.product_name, "Old Game");
        assert!(!config.needs_migration());
        assert!(!store.exists(ProductConfig::FILE_NAME));
    }

    #[test]
    fn test_current_product_config_not_migrated() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path());
        store.save_file(&ProductConfig::new()).unwrap();
        write(tmp.path(), LegacyConfig::FILE_NAME, r#"{"productName": "Old"}"#);

        let (config, report) = store.load_migrated_product_config().unwrap();
        assert!(report.is_none());
        assert_eq!(config.product_name, "");
    }

    #[test]
    fn test_platform_configs_lists_present_files() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path());
        store
            .save_platform_config(Platform::Linux, &PlatformConfig::for_platform(Platform::Linux))
            .unwrap();

        let configs = store.platform_configs().unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].0, Platform::Linux);
    }

    #[test]
    fn test_missing_steam_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path());
        assert_eq!(store.load_steam_config().unwrap(), SteamConfig::default());
    }
}
