// Config store: the cached API key lives in `~/.pushbullet/config.json`.
// Loading never fails; a missing or broken file just means "no key yet".

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Pushbullet access tokens are always this long.
pub const API_KEY_LEN: usize = 45;

const CONFIG_DIR: &str = ".pushbullet";
const CONFIG_FILENAME: &str = "config.json";

/// Persisted CLI configuration. Built once at startup, filled in by the
/// key prompt at most once, then only read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Config {
    /// Read the config at `path`, or return the empty config if the file
    /// is absent, unreadable or not valid JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, starting empty");
            return Self::default();
        }

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read config file");
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring malformed config file");
                Self::default()
            }
        }
    }

    /// Write the config to `path`, replacing whatever was there.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_json::to_string(self)?;
        fs::write(path, content)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// The stored key, if it is present and well-formed.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| validate_api_key(key))
    }
}

/// Accepts exactly 45-character keys.
pub fn validate_api_key(key: &str) -> bool {
    key.chars().count() == API_KEY_LEN
}

/// `<home>/.pushbullet/config.json`, or relative to the working directory
/// when no home directory can be found.
pub fn default_config_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(CONFIG_DIR).join(CONFIG_FILENAME)
}
