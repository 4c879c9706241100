// src/config/app.rs
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use super::defaults::*;
use crate::crypto::Keyring;
use crate::error::{Result, StoreError};

pub const ENV_CONFIG: &str = "TOTP_STORE_CONFIG";
pub const ENV_TOKEN_FILE: &str = "TOTP_STORE_FILE";
pub const ENV_MASTER_KEY: &str = "TOTP_STORE_MASTER_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_paths")]
    pub paths: Paths,
    #[serde(default = "default_crypto")]
    pub crypto: CryptoConfig,
    #[serde(default = "default_features")]
    pub features: Features,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    pub token_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CryptoConfig {
    pub key_slot: u8,
    pub master_key_hex: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Features {
    pub allow_plaintext_export: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            crypto: default_crypto(),
            features: default_features(),
        }
    }
}

impl Config {
    /// Keyring holding the configured slot, derived from the master key
    pub fn keyring(&self) -> Result<Keyring> {
        Keyring::derive_from_hex(&self.crypto.master_key_hex, [self.crypto.key_slot])
    }

    pub fn uses_dev_key(&self) -> bool {
        self.crypto.master_key_hex == DEV_MASTER_KEY_HEX
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(ENV_TOKEN_FILE) {
            self.paths.token_file = PathBuf::from(path);
        }
        if let Ok(master) = std::env::var(ENV_MASTER_KEY) {
            self.crypto.master_key_hex = master;
        }
    }
}

/// Load config from `$TOTP_STORE_CONFIG` (default `totp-store.toml`)
///
/// A missing file means built-in defaults; a malformed one is an error.
pub fn load() -> Result<Config> {
    let config_path =
        std::env::var(ENV_CONFIG).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    let mut conf = if Path::new(&config_path).exists() {
        read_file(Path::new(&config_path))?
    } else {
        warn!(path = %config_path, "config file not found, using built-in defaults");
        Config::default()
    };
    conf.apply_env_overrides();

    if conf.uses_dev_key() {
        warn!("using the development master key, secrets are not protected");
    }
    Ok(conf)
}

/// Load config from an explicit path; env overrides still apply
pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Config> {
    let mut conf = read_file(path.as_ref())?;
    conf.apply_env_overrides();
    Ok(conf)
}

fn read_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| StoreError::Format(format!("invalid TOML in {}: {e}", path.display())))
}
