//! Configuration types for folio.
//!
//! [`Config`] carries the naming conventions a content tree follows: which file
//! is a directory's index, where archived files go, which names are hidden from
//! listings. Every option has a default, so `Config::default()` works for the
//! common layout. Configuration can be persisted as TOML.
//!
//! # Example
//!
//! ```ignore
//! use folio_core::config::Config;
//!
//! let config = Config::from_toml_str(r#"
//! archive_directory_name = ".archive"
//! directory_excludes = ["node_modules"]
//! "#)?;
//! assert_eq!(config.index_file_name, "index.md");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::storage::Storage;

/// The parts of a content tree's layout that a consumer can configure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File name of the per-directory index document
    pub index_file_name: String,

    /// Name of the per-directory archive subdirectory
    pub archive_directory_name: String,

    /// Icon used for directories whose index declares none
    pub default_index_icon: String,

    /// Placeholder title for directories without a name (the root)
    pub default_directory_name: String,

    /// Top-level index frontmatter keys passed through untouched
    pub index_meta_includes: Vec<String>,

    /// Directory names hidden from every listing and tree
    pub directory_excludes: Vec<String>,

    /// Reserved per-directory metadata file, always excluded from listings
    pub meta_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_file_name: "index.md".to_string(),
            archive_directory_name: "_".to_string(),
            default_index_icon: "📁".to_string(),
            default_directory_name: "Untitled".to_string(),
            index_meta_includes: Vec::new(),
            directory_excludes: Vec::new(),
            meta_file_name: ".meta.json".to_string(),
        }
    }
}

impl Config {
    /// Returns true if `name` must never show up in a directory listing.
    pub fn is_excluded_name(&self, name: &str) -> bool {
        name == self.archive_directory_name
            || name == self.meta_file_name
            || self.directory_excludes.iter().any(|e| e == name)
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize this config as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load config from a specific path in a storage backend.
    pub async fn load_from(storage: &dyn Storage, path: &Path) -> Result<Self> {
        let contents = storage
            .read_file(path)
            .await
            .map_err(|e| FolioError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?
            .ok_or_else(|| FolioError::NotFound(path.to_path_buf()))?;

        Self::from_toml_str(&contents)
    }

    /// Load config from a storage backend, returning the default if it is absent or invalid.
    pub async fn load_from_or_default(storage: &dyn Storage, path: &Path) -> Self {
        match Self::load_from(storage, path).await {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default config ({})", e);
                Self::default()
            }
        }
    }

    /// Save config to a specific path in a storage backend.
    pub async fn save_to(&self, storage: &dyn Storage, path: &Path) -> Result<()> {
        let contents = self.to_toml_string()?;
        storage
            .write_file(path, &contents)
            .await
            .map_err(|e| FolioError::FileWrite {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryStorage, block_on_test};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.index_file_name, "index.md");
        assert_eq!(config.archive_directory_name, "_");
        assert_eq!(config.meta_file_name, ".meta.json");
        assert!(config.index_meta_includes.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            "archive_directory_name = \".archive\"\ndirectory_excludes = [\"drafts\"]\n",
        )
        .unwrap();
        assert_eq!(config.archive_directory_name, ".archive");
        assert_eq!(config.directory_excludes, vec!["drafts"]);
        assert_eq!(config.index_file_name, "index.md");
    }

    #[test]
    fn test_excluded_names() {
        let config = Config {
            directory_excludes: vec!["node_modules".to_string()],
            ..Config::default()
        };
        assert!(config.is_excluded_name("_"));
        assert!(config.is_excluded_name(".meta.json"));
        assert!(config.is_excluded_name("node_modules"));
        assert!(!config.is_excluded_name("guide"));
    }

    #[test]
    fn test_save_and_load_through_storage() {
        let storage = InMemoryStorage::new();
        let config = Config {
            index_meta_includes: vec!["layout".to_string()],
            ..Config::default()
        };

        block_on_test(config.save_to(&storage, Path::new("folio.toml"))).unwrap();
        let loaded = block_on_test(Config::load_from(&storage, Path::new("folio.toml"))).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_falls_back_to_default() {
        let storage = InMemoryStorage::new();
        let result = block_on_test(Config::load_from(&storage, Path::new("missing.toml")));
        assert!(result.unwrap_err().is_not_found());

        let config = block_on_test(Config::load_from_or_default(
            &storage,
            Path::new("missing.toml"),
        ));
        assert_eq!(config, Config::default());
    }
}
