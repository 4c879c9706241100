// src/crypto/mod.rs
//! Secret encryption boundary: no file I/O
//!
//! Everything here works on in-memory buffers. The store only ever calls the
//! [`CryptoProvider`] trait; [`Keyring`] is the software-backed provider used
//! by the CLI and the tests, standing in for a hardware key-slot engine.

mod decrypt;
mod encrypt;
mod keyring;
mod legacy;
mod rotate;

pub use decrypt::decrypt_v2;
pub use encrypt::encrypt_v2;
pub use keyring::Keyring;
pub use legacy::{decrypt_v1, encrypt_v1};
pub use rotate::rekey;

use rand::Rng;

use crate::aliases::PlainSecret;
use crate::consts::{ACCEPTABLE_KEY_SLOTS, IV_LENGTH};
use crate::enums::CryptoVersion;
use crate::error::{Result, StoreError};

/// Parameters of the secret transform, supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoSettings {
    pub key_slot: u8,
    pub iv: [u8; IV_LENGTH],
    /// Version the stored secrets were written with
    pub version: CryptoVersion,
}

impl CryptoSettings {
    pub fn new(key_slot: u8, iv: [u8; IV_LENGTH], version: CryptoVersion) -> Result<Self> {
        if !ACCEPTABLE_KEY_SLOTS.contains(&key_slot) {
            return Err(StoreError::Validation(format!(
                "key slot {key_slot} outside {}..={}",
                ACCEPTABLE_KEY_SLOTS.start(),
                ACCEPTABLE_KEY_SLOTS.end()
            )));
        }
        Ok(Self {
            key_slot,
            iv,
            version,
        })
    }

    /// Fresh settings for a new store: random IV, current version
    pub fn generate(key_slot: u8) -> Result<Self> {
        let mut iv = [0u8; IV_LENGTH];
        rand::rng().fill(&mut iv);
        Self::new(key_slot, iv, CryptoVersion::CURRENT)
    }

    /// Same key slot and IV, but targeting the current version
    pub fn upgraded(&self) -> Self {
        Self {
            version: CryptoVersion::CURRENT,
            ..*self
        }
    }

    pub fn needs_migration(&self) -> bool {
        self.version != CryptoVersion::CURRENT
    }
}

/// Encrypt/decrypt capability injected into the store
///
/// `encrypt` must be deterministic for equal inputs and always emit
/// [`CryptoVersion::CURRENT`]. `decrypt` honours `settings.version`.
pub trait CryptoProvider {
    fn encrypt(&self, plaintext: &[u8], settings: &CryptoSettings) -> Result<Vec<u8>>;

    fn decrypt(&self, ciphertext: &[u8], settings: &CryptoSettings) -> Result<PlainSecret>;
}

impl<P: CryptoProvider + ?Sized> CryptoProvider for &P {
    fn encrypt(&self, plaintext: &[u8], settings: &CryptoSettings) -> Result<Vec<u8>> {
        (**self).encrypt(plaintext, settings)
    }

    fn decrypt(&self, ciphertext: &[u8], settings: &CryptoSettings) -> Result<PlainSecret> {
        (**self).decrypt(ciphertext, settings)
    }
}
