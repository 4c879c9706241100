// src/crypto/rotate.rs
use super::{CryptoProvider, CryptoSettings};
use crate::error::Result;

/// Re-encrypt one secret: decrypt under `from`, encrypt under `to`
///
/// Also the migration path: `to` only contributes key slot and IV, the output
/// is always the current crypto version.
pub fn rekey<P: CryptoProvider + ?Sized>(
    provider: &P,
    ciphertext: &[u8],
    from: &CryptoSettings,
    to: &CryptoSettings,
) -> Result<Vec<u8>> {
    let plaintext = provider.decrypt(ciphertext, from)?;
    provider.encrypt(plaintext.expose_secret(), to)
}
