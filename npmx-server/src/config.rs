//! # Configuration Management
//!
//! Server configuration loaded from a JSON file, with the embedded
//! `config.json` as the default:
//!
//! - [`ServerConfig`]: bind address
//! - [`UpstreamConfig`]: file listing service
//! - [`CacheConfig`]: response cache sizing and lifetime
//! - [`AssetsConfig`]: static asset directories
//! - [`BuildConfig`]: inputs for build metadata
//!
//! ```rust,no_run
//! # use npmx_server::config::Config;
//! // Load from file with fallback to defaults
//! let config = Config::load_or_default("npmx.json")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use npmx_build_env::AssetLayout;
use serde::{Deserialize, Serialize};

use crate::cache::CacheOptions;
use crate::error::AppResult;

/// Main configuration structure for the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings for the file listing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the jsDelivr packages API
    pub files_url: String,
    /// HTTP request timeout for upstream calls
    pub timeout_secs: u64,
    /// Product token sent in `User-Agent`, the crate version is appended
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            files_url: "https://data.jsdelivr.com/v1/packages".to_string(),
            timeout_secs: 30,
            user_agent: "npmx-server".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached responses
    pub capacity: usize,
    pub max_age_secs: u64,
    /// Serve expired entries while refreshing them in the background
    pub swr: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let options = CacheOptions::default();
        Self {
            capacity: 10_000,
            max_age_secs: options.max_age.as_secs(),
            swr: options.swr,
        }
    }
}

impl CacheConfig {
    pub fn options(&self) -> CacheOptions {
        CacheOptions {
            max_age: Duration::from_secs(self.max_age_secs),
            swr: self.swr,
        }
    }
}

/// Static asset directories, relative to `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    pub root: PathBuf,
    pub public_dir: PathBuf,
    pub dev_dir: PathBuf,
    pub staging_dir: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            public_dir: PathBuf::from("public"),
            dev_dir: PathBuf::from("public-dev"),
            staging_dir: PathBuf::from("public-staging"),
        }
    }
}

impl AssetsConfig {
    pub fn layout(&self) -> AssetLayout {
        AssetLayout {
            public_dir: self.root.join(&self.public_dir),
            dev_dir: self.root.join(&self.dev_dir),
            staging_dir: self.root.join(&self.staging_dir),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Source whose modification date is published as the privacy policy date,
    /// relative to the assets root
    pub privacy_policy_path: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            privacy_policy_path: PathBuf::from("public/privacy.html"),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not match the expected
    /// configuration format.
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config_str = fs::read_to_string(path)?;
        let config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Load configuration from file with fallback to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn privacy_policy_path(&self) -> PathBuf {
        self.assets.root.join(&self.build.privacy_policy_path)
    }
}

impl Default for Config {
    fn default() -> Self {
        serde_json::from_str(include_str!("../config.json"))
            .expect("embedded config.json must be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn embedded_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.files_url, "https://data.jsdelivr.com/v1/packages");
        assert_eq!(config.cache.max_age_secs, 31_536_000);
        assert!(config.cache.swr);
        assert_eq!(
            config.privacy_policy_path(),
            PathBuf::from("./public/privacy.html")
        );
    }

    #[test]
    fn partial_file_uses_section_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("npmx.json");
        fs::write(
            &path,
            r#"{"server": {"host": "127.0.0.1", "port": 8080}, "cache": {"capacity": 5, "max_age_secs": 60, "swr": false}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.cache.capacity, 5);
        assert_eq!(config.cache.options().max_age, Duration::from_secs(60));
        assert!(!config.cache.options().swr);
        assert_eq!(config.upstream.timeout_secs, 30);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_or_default(temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("npmx.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    fn asset_layout_is_rooted() {
        let mut config = Config::default();
        config.assets.root = PathBuf::from("/srv/npmx");
        let layout = config.assets.layout();
        assert_eq!(layout.staging_dir, PathBuf::from("/srv/npmx/public-staging"));
    }
}
