// src/crypto/decrypt.rs
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};

use super::encrypt::associated_data;
use crate::aliases::PlainSecret;
use crate::consts::{NONCE_LENGTH, TAG_LENGTH};
use crate::enums::CryptoVersion;
use crate::error::{Result, StoreError};

/// Decrypt a secret written by [`super::encrypt_v2`]
pub fn decrypt_v2(key: &[u8; 32], key_slot: u8, ciphertext: &[u8]) -> Result<PlainSecret> {
    if ciphertext.len() < NONCE_LENGTH + TAG_LENGTH {
        return Err(StoreError::Crypto(format!(
            "v2 ciphertext too short: {} bytes",
            ciphertext.len()
        )));
    }
    let (nonce, sealed) = ciphertext.split_at(NONCE_LENGTH);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| StoreError::Crypto("invalid AES-256 key length".into()))?;
    let aad = associated_data(CryptoVersion::V2, key_slot);
    let plaintext = cipher.decrypt(
        Nonce::from_slice(nonce),
        Payload {
            msg: sealed,
            aad: &aad,
        },
    )?;
    Ok(PlainSecret::new(plaintext))
}
