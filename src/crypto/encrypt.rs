// src/crypto/encrypt.rs
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::consts::{IV_LENGTH, NONCE_LENGTH};
use crate::enums::CryptoVersion;
use crate::error::{Result, StoreError};

/// Encrypt a secret with the current scheme (AES-256-GCM)
///
/// The nonce is a keyed BLAKE3 hash of `iv ‖ plaintext`, so equal inputs give
/// equal output while distinct secrets never share a nonce.
/// Layout: `nonce ‖ ciphertext ‖ tag`.
pub fn encrypt_v2(
    key: &[u8; 32],
    key_slot: u8,
    iv: &[u8; IV_LENGTH],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let nonce_hash = blake3::Hasher::new_keyed(key)
        .update(iv)
        .update(plaintext)
        .finalize();
    let nonce = &nonce_hash.as_bytes()[..NONCE_LENGTH];

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| StoreError::Crypto("invalid AES-256 key length".into()))?;
    let aad = associated_data(CryptoVersion::V2, key_slot);
    let sealed = cipher.encrypt(
        Nonce::from_slice(nonce),
        Payload {
            msg: plaintext,
            aad: &aad,
        },
    )?;

    let mut out = Vec::with_capacity(NONCE_LENGTH + sealed.len());
    out.extend_from_slice(nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

pub(crate) fn associated_data(version: CryptoVersion, key_slot: u8) -> [u8; 2] {
    [version.as_u8(), key_slot]
}
