// src/token/secret.rs
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use data_encoding::{Encoding, Specification};

use crate::aliases::PlainSecret;
use crate::enums::SecretEncoding;
use crate::error::{Result, StoreError};

/// RFC 4648 base32 without padding that ignores non-zero trailing bits
fn lenient_base32() -> Result<Encoding> {
    let mut alphabet = Specification::new();
    alphabet.symbols.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ234567");
    alphabet.check_trailing_bits = false;
    alphabet
        .encoding()
        .map_err(|e| StoreError::Validation(format!("base32 alphabet: {e}")))
}

/// Decode a user-entered secret from its presentation encoding
///
/// Base32 input is accepted in any case, with whitespace, dashes and
/// `=` padding. Failures are validation errors, never crypto errors.
pub fn decode_secret(input: &str, encoding: SecretEncoding) -> Result<PlainSecret> {
    let bytes = match encoding {
        SecretEncoding::Base32 => {
            let normalized: String = input
                .chars()
                .filter(|ch| !ch.is_ascii_whitespace() && *ch != '-')
                .map(|ch| ch.to_ascii_uppercase())
                .collect();
            lenient_base32()?
                .decode(normalized.trim_end_matches('=').as_bytes())
                .map_err(|e| StoreError::Validation(format!("secret is not valid base32: {e}")))?
        }
        SecretEncoding::Base64 => {
            let normalized: String = input
                .chars()
                .filter(|ch| !ch.is_ascii_whitespace())
                .collect();
            STANDARD
                .decode(normalized)
                .map_err(|e| StoreError::Validation(format!("secret is not valid base64: {e}")))?
        }
    };

    if bytes.is_empty() {
        return Err(StoreError::Validation("secret is empty".into()));
    }
    Ok(PlainSecret::new(bytes))
}
