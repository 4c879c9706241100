// src/crypto/keyring.rs
use std::collections::HashMap;

use super::{decrypt_v1, decrypt_v2, encrypt_v2, CryptoProvider, CryptoSettings};
use crate::aliases::{PlainSecret, SlotKey32};
use crate::consts::{ACCEPTABLE_KEY_SLOTS, KEY_DERIVE_CONTEXT};
use crate::enums::CryptoVersion;
use crate::error::{Result, StoreError};

/// Software key-slot engine: one 256-bit key per slot id
#[derive(Default, Debug)]
pub struct Keyring {
    slots: HashMap<u8, SlotKey32>,
}

impl Keyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a key into a slot, replacing whatever was there
    pub fn insert(&mut self, slot: u8, key: [u8; 32]) -> Result<()> {
        if !ACCEPTABLE_KEY_SLOTS.contains(&slot) {
            return Err(StoreError::Validation(format!("key slot {slot} is not usable")));
        }
        self.slots.insert(slot, SlotKey32::new(key));
        Ok(())
    }

    /// Derive an independent key per slot from one master secret
    pub fn derive(master: &[u8], slots: impl IntoIterator<Item = u8>) -> Result<Self> {
        let mut keyring = Self::new();
        for slot in slots {
            let key = blake3::Hasher::new_derive_key(KEY_DERIVE_CONTEXT)
                .update(master)
                .update(&[slot])
                .finalize();
            keyring.insert(slot, *key.as_bytes())?;
        }
        Ok(keyring)
    }

    /// Same as [`Keyring::derive`] with the master secret given as hex
    pub fn derive_from_hex(master_hex: &str, slots: impl IntoIterator<Item = u8>) -> Result<Self> {
        let master = PlainSecret::new(
            hex::decode(master_hex.trim())
                .map_err(|e| StoreError::Validation(format!("master key is not hex: {e}")))?,
        );
        if master.expose_secret().len() < 16 {
            return Err(StoreError::Validation(
                "master key must be at least 16 bytes".into(),
            ));
        }
        Self::derive(master.expose_secret(), slots)
    }

    pub fn has_slot(&self, slot: u8) -> bool {
        self.slots.contains_key(&slot)
    }

    fn slot_key(&self, slot: u8) -> Result<&[u8; 32]> {
        self.slots
            .get(&slot)
            .map(|key| key.expose_secret())
            .ok_or_else(|| StoreError::Crypto(format!("no key loaded in slot {slot}")))
    }
}

impl CryptoProvider for Keyring {
    fn encrypt(&self, plaintext: &[u8], settings: &CryptoSettings) -> Result<Vec<u8>> {
        let key = self.slot_key(settings.key_slot)?;
        encrypt_v2(key, settings.key_slot, &settings.iv, plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8], settings: &CryptoSettings) -> Result<PlainSecret> {
        let key = self.slot_key(settings.key_slot)?;
        match settings.version {
            CryptoVersion::V1 => decrypt_v1(key, &settings.iv, ciphertext),
            CryptoVersion::V2 => decrypt_v2(key, settings.key_slot, ciphertext),
        }
    }
}
