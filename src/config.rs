//! Client settings: defaults, optional TOML file, environment, command line.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const APP_DIR: &str = "vcard-manager";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid server url {value:?}: {source}")]
    ServerUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the card server. Always ends with `/`.
    pub server_url: Url,
    /// Directory holding the persisted status log.
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
    /// Upload form target, relative to `server_url`.
    pub upload_path: String,
    /// Multipart field name the server reads the card file from.
    pub upload_field: String,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join(APP_DIR);

        Self {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server url is valid"),
            data_dir,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            upload_path: "upload".to_string(),
            upload_field: "uploadFile".to_string(),
        }
    }
}

/// On-disk layout of `config.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    server_url: Option<String>,
    data_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    upload_path: Option<String>,
    upload_field: Option<String>,
}

#[derive(Debug, Parser)]
#[command(name = "vcard-manager", version, about = "Browse and upload vCard files")]
pub struct Cli {
    /// Card server base URL
    #[arg(long, env = "VCARD_SERVER_URL")]
    pub server: Option<String>,

    /// Directory for persisted client state
    #[arg(long, env = "VCARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Settings {
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Loads settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        let Some(path) = path else {
            return Ok(settings);
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(settings);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(url) = file.server_url {
            settings.server_url = parse_server_url(&url)?;
        }
        if let Some(dir) = file.data_dir {
            settings.data_dir = dir;
        }
        if let Some(timeout) = file.request_timeout_secs {
            settings.request_timeout_secs = timeout;
        }
        if let Some(upload_path) = file.upload_path {
            settings.upload_path = upload_path;
        }
        if let Some(upload_field) = file.upload_field {
            settings.upload_field = upload_field;
        }
        Ok(settings)
    }

    /// Resolves the final settings: command line and environment win over
    /// the config file, which wins over defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let config_path = cli.config.clone().or_else(Self::default_config_path);
        let mut settings = Self::load(config_path.as_deref())?;

        if let Some(url) = &cli.server {
            settings.server_url = parse_server_url(url)?;
        }
        if let Some(dir) = &cli.data_dir {
            settings.data_dir = dir.clone();
        }
        Ok(settings)
    }
}

/// Parses a server URL and appends a trailing `/` so endpoint joins keep
/// any base path.
pub fn parse_server_url(value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value).map_err(|source| ConfigError::ServerUrl {
        value: value.to_string(),
        source,
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
