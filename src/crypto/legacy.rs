// src/crypto/legacy.rs
//! Crypto v1: ChaCha20-Poly1305 keyed by slot, nonce taken from the base IV
//!
//! Kept so stores written by older releases stay readable. Nothing in the
//! store writes v1 any more; [`encrypt_v1`] only exists to produce such data.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};

use crate::aliases::PlainSecret;
use crate::consts::{IV_LENGTH, NONCE_LENGTH, TAG_LENGTH};
use crate::error::{Result, StoreError};

pub fn encrypt_v1(key: &[u8; 32], iv: &[u8; IV_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|_| StoreError::Crypto("invalid ChaCha20 key length".into()))?;
    Ok(cipher.encrypt(Nonce::from_slice(&iv[..NONCE_LENGTH]), plaintext)?)
}

pub fn decrypt_v1(key: &[u8; 32], iv: &[u8; IV_LENGTH], ciphertext: &[u8]) -> Result<PlainSecret> {
    if ciphertext.len() < TAG_LENGTH {
        return Err(StoreError::Crypto(format!(
            "v1 ciphertext too short: {} bytes",
            ciphertext.len()
        )));
    }
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|_| StoreError::Crypto("invalid ChaCha20 key length".into()))?;
    let plaintext = cipher.decrypt(Nonce::from_slice(&iv[..NONCE_LENGTH]), ciphertext)?;
    Ok(PlainSecret::new(plaintext))
}
