// src/store/header.rs
use std::io::Write;

use super::codec::write_field;
use crate::consts::*;
use crate::crypto::CryptoSettings;
use crate::enums::CryptoVersion;
use crate::error::{Result, StoreError};

/// Fields preceding the first token record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigHeader {
    pub file_type: String,
    pub version: u32,
    pub crypto_version: Option<CryptoVersion>,
    pub key_slot: Option<u8>,
    pub base_iv: Option<[u8; IV_LENGTH]>,
    /// Ciphertext of [`CRYPTO_VERIFY_MARKER`] under the store's settings
    pub crypto_verify: Option<Vec<u8>>,
    /// Header keys this crate does not know, kept verbatim
    pub extra: Vec<(String, String)>,
}

impl ConfigHeader {
    /// Header for a brand new store written by this crate
    pub fn new(settings: &CryptoSettings, crypto_verify: Vec<u8>) -> Self {
        Self {
            file_type: CONFIG_FILE_TYPE.to_string(),
            version: CONFIG_FILE_VERSION,
            crypto_version: Some(settings.version),
            key_slot: Some(settings.key_slot),
            base_iv: Some(settings.iv),
            crypto_verify: Some(crypto_verify),
            extra: Vec::new(),
        }
    }

    /// Crypto settings recorded in the header, if all of them are present
    pub fn crypto_settings(&self) -> Option<CryptoSettings> {
        Some(CryptoSettings {
            key_slot: self.key_slot?,
            iv: self.base_iv?,
            version: self.crypto_version?,
        })
    }

    pub fn apply_settings(&mut self, settings: &CryptoSettings, crypto_verify: Vec<u8>) {
        self.crypto_version = Some(settings.version);
        self.key_slot = Some(settings.key_slot);
        self.base_iv = Some(settings.iv);
        self.crypto_verify = Some(crypto_verify);
    }

    pub(crate) fn empty() -> Self {
        Self {
            file_type: String::new(),
            version: 0,
            crypto_version: None,
            key_slot: None,
            base_iv: None,
            crypto_verify: None,
            extra: Vec::new(),
        }
    }

    pub(crate) fn set_field(&mut self, key: &str, value: &str, line_no: usize) -> Result<()> {
        let bad = |what: &str| StoreError::Format(format!("line {line_no}: invalid {what} '{value}'"));
        match key {
            KEY_FILETYPE => self.file_type = value.to_string(),
            KEY_VERSION => self.version = value.parse().map_err(|_| bad(KEY_VERSION))?,
            KEY_CRYPTO_VERSION => {
                let raw: u8 = value.parse().map_err(|_| bad(KEY_CRYPTO_VERSION))?;
                self.crypto_version = Some(CryptoVersion::try_from(raw)?);
            }
            KEY_CRYPTO_KEY_SLOT => {
                self.key_slot = Some(value.parse().map_err(|_| bad(KEY_CRYPTO_KEY_SLOT))?)
            }
            KEY_BASE_IV => {
                let bytes = hex::decode(value).map_err(|_| bad(KEY_BASE_IV))?;
                let iv: [u8; IV_LENGTH] = bytes.try_into().map_err(|_| bad(KEY_BASE_IV))?;
                self.base_iv = Some(iv);
            }
            KEY_CRYPTO_VERIFY => {
                self.crypto_verify = Some(hex::decode(value).map_err(|_| bad(KEY_CRYPTO_VERIFY))?)
            }
            _ => self.extra.push((key.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Reject files that are not token stores of the supported version
    pub fn validate(&self) -> Result<()> {
        if self.file_type != CONFIG_FILE_TYPE {
            return Err(StoreError::Format(format!(
                "unexpected file type '{}'",
                self.file_type
            )));
        }
        if self.version != CONFIG_FILE_VERSION {
            return Err(StoreError::Format(format!(
                "unsupported config version {} (expected {CONFIG_FILE_VERSION})",
                self.version
            )));
        }
        Ok(())
    }

    pub(crate) fn write_to(&self, out: &mut dyn Write) -> std::io::Result<()> {
        write_field(out, KEY_FILETYPE, &self.file_type)?;
        write_field(out, KEY_VERSION, &self.version.to_string())?;
        if let Some(version) = self.crypto_version {
            write_field(out, KEY_CRYPTO_VERSION, &version.as_u8().to_string())?;
        }
        if let Some(slot) = self.key_slot {
            write_field(out, KEY_CRYPTO_KEY_SLOT, &slot.to_string())?;
        }
        if let Some(iv) = &self.base_iv {
            write_field(out, KEY_BASE_IV, &hex::encode(iv))?;
        }
        if let Some(verify) = &self.crypto_verify {
            write_field(out, KEY_CRYPTO_VERIFY, &hex::encode(verify))?;
        }
        for (key, value) in &self.extra {
            write_field(out, key, value)?;
        }
        Ok(())
    }
}
