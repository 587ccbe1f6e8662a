use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::core::error::{Error, Result};

pub const PAGE_SIZES: [u32; 3] = [20, 40, 60];
pub const DEFAULT_PAGE_SIZE: u32 = PAGE_SIZES[0];

/// Runtime config.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: Url,
    pub username: String,
    pub page_size: u32,
    pub download_dir: Option<PathBuf>,
}

/// On-disk representation. The session token is either a keyring reference or plaintext.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    pub api_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenBackend>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "backend")]
pub enum TokenBackend {
    #[serde(rename = "keyring")]
    Keyring,
    #[serde(rename = "plaintext")]
    Plaintext { value: String },
}

/// Why a command can't run with what's configured.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNeedsInput {
    /// No backend URL known; `login --api-url` is required.
    FullSetup,
    /// Backend known, but there is no usable session.
    LoginOnly {
        api_url: String,
        username: String,
        error: Option<String>,
    },
}

impl std::fmt::Display for ConfigNeedsInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigNeedsInput::FullSetup => {
                write!(f, "No backend configured. Run `webmail login --api-url <URL>` first.")
            }
            ConfigNeedsInput::LoginOnly { error: Some(e), .. } => {
                write!(f, "Not logged in ({e}). Run `webmail login`.")
            }
            ConfigNeedsInput::LoginOnly { .. } => write!(f, "Not logged in. Run `webmail login`."),
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("webmail")
        .join("config.json")
}

/// Parse a base URL and make sure endpoint names join *under* it.
pub fn normalize_api_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&with_slash)?)
}

/// Snap to the nearest offered page size.
pub fn clamp_page_size(n: u32) -> u32 {
    PAGE_SIZES
        .iter()
        .copied()
        .min_by_key(|p| p.abs_diff(n))
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

impl FileConfig {
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        let cfg = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("parse {}: {e}", path.display())))?;
        Ok(Some(cfg))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

impl Config {
    /// Try env vars. Returns None if any required var is missing.
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("WEBMAIL_API_URL").ok()?;
        let username = std::env::var("WEBMAIL_USER").ok()?;
        let api_url = match normalize_api_url(&api_url) {
            Ok(u) => u,
            Err(e) => {
                log::warn!("Ignoring WEBMAIL_API_URL: {e}");
                return None;
            }
        };
        Some(Config {
            api_url,
            username: username.trim().to_lowercase(),
            page_size: env_page_size().unwrap_or(DEFAULT_PAGE_SIZE),
            download_dir: std::env::var_os("WEBMAIL_DOWNLOAD_DIR").map(PathBuf::from),
        })
    }

    pub fn from_file_config(fc: &FileConfig) -> Result<Self> {
        Ok(Config {
            api_url: normalize_api_url(&fc.api_url)?,
            username: fc.username.clone(),
            page_size: env_page_size().unwrap_or_else(|| clamp_page_size(fc.page_size)),
            download_dir: std::env::var_os("WEBMAIL_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .or_else(|| fc.download_dir.clone()),
        })
    }

    /// Resolution order: env vars → config file → Err(ConfigNeedsInput).
    pub fn resolve() -> std::result::Result<Self, ConfigNeedsInput> {
        if let Some(config) = Self::from_env() {
            log::info!("Config loaded from environment variables");
            return Ok(config);
        }

        match FileConfig::load() {
            Ok(Some(fc)) => match Self::from_file_config(&fc) {
                Ok(config) => {
                    log::info!("Config loaded from {}", config_path().display());
                    Ok(config)
                }
                Err(e) => {
                    log::warn!("Config file error: {}", e);
                    Err(ConfigNeedsInput::FullSetup)
                }
            },
            Ok(None) => {
                log::info!("No config file found, need full setup");
                Err(ConfigNeedsInput::FullSetup)
            }
            Err(e) => {
                log::warn!("Config file error: {}", e);
                Err(ConfigNeedsInput::FullSetup)
            }
        }
    }

    /// Host part used to key the stored session token.
    pub fn host(&self) -> String {
        self.api_url.host_str().unwrap_or("localhost").to_string()
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn env_page_size() -> Option<u32> {
    std::env::var("WEBMAIL_PAGE_SIZE")
        .ok()
        .and_then(|p| p.trim().parse().ok())
        .map(clamp_page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_gets_trailing_slash() {
        let u = normalize_api_url("https://mail.example.com/api").unwrap();
        assert_eq!(u.as_str(), "https://mail.example.com/api/");
        assert_eq!(u.join("listMessages").unwrap().as_str(), "https://mail.example.com/api/listMessages");

        let u = normalize_api_url(" http://localhost:8080/api/ ").unwrap();
        assert_eq!(u.join("auth/login").unwrap().as_str(), "http://localhost:8080/api/auth/login");
    }

    #[test]
    fn api_url_rejects_garbage() {
        assert!(normalize_api_url("not a url").is_err());
    }

    #[test]
    fn page_size_snaps_to_offered_sizes() {
        assert_eq!(clamp_page_size(0), 20);
        assert_eq!(clamp_page_size(20), 20);
        assert_eq!(clamp_page_size(33), 40);
        assert_eq!(clamp_page_size(55), 60);
        assert_eq!(clamp_page_size(500), 60);
    }

    #[test]
    fn file_config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        assert_eq!(FileConfig::load_from(&path).unwrap(), None);

        let fc = FileConfig {
            api_url: "https://mail.example.com/api/".into(),
            username: "alice".into(),
            page_size: 40,
            download_dir: None,
            token: Some(TokenBackend::Plaintext { value: "jwt".into() }),
        };
        fc.save_to(&path).unwrap();
        let loaded = FileConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded, fc);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"backend\": \"plaintext\""));
    }

    #[test]
    fn file_config_defaults_page_size() {
        let fc: FileConfig =
            serde_json::from_str(r#"{"api_url":"http://h/api/","token":{"backend":"keyring"}}"#)
                .unwrap();
        assert_eq!(fc.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(fc.token, Some(TokenBackend::Keyring));
        assert!(fc.username.is_empty());
    }

    #[test]
    fn host_keys_the_token() {
        let fc = FileConfig {
            api_url: "https://mail.example.com:8443/api".into(),
            username: "bob".into(),
            page_size: 20,
            ..Default::default()
        };
        let config = Config::from_file_config(&fc).unwrap();
        assert_eq!(config.host(), "mail.example.com");
    }
}
