// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{CryptoConfig, Features, Paths};
use crate::consts::{DEFAULT_KEY_SLOT, DEFAULT_TOKEN_FILE_NAME};

pub const DEFAULT_CONFIG_FILE: &str = "totp-store.toml";

/// hex("totp-store-dev-master-key-2025!!"), development only
pub const DEV_MASTER_KEY_HEX: &str =
    "746f74702d73746f72652d6465762d6d61737465722d6b65792d323032352121";

pub fn default_paths() -> Paths {
    let token_file = dirs::config_dir()
        .map(|dir| dir.join("totp-store").join(DEFAULT_TOKEN_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE_NAME));
    Paths { token_file }
}

pub fn default_crypto() -> CryptoConfig {
    CryptoConfig {
        key_slot: DEFAULT_KEY_SLOT,
        master_key_hex: DEV_MASTER_KEY_HEX.into(),
    }
}

pub fn default_features() -> Features {
    Features {
        allow_plaintext_export: false,
    }
}
