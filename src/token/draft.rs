// src/token/draft.rs
use std::ops::{Deref, DerefMut};

use super::{decode_secret, TokenRecord};
use crate::crypto::{CryptoProvider, CryptoSettings};
use crate::enums::SecretEncoding;
use crate::error::Result;

/// Working copy handed to a mutation callback
///
/// Dereferences to the record being built. Secrets go in through
/// [`TokenDraft::set_secret`], which encrypts immediately, so the plaintext
/// is dropped (and zeroized) before the callback returns.
pub struct TokenDraft<'a> {
    record: TokenRecord,
    provider: &'a dyn CryptoProvider,
    settings: &'a CryptoSettings,
    secret_changed: bool,
}

impl<'a> TokenDraft<'a> {
    pub(crate) fn new(
        record: TokenRecord,
        provider: &'a dyn CryptoProvider,
        settings: &'a CryptoSettings,
    ) -> Self {
        Self {
            record,
            provider,
            settings,
            secret_changed: false,
        }
    }

    /// Decode `input` and store its ciphertext as the token secret
    pub fn set_secret(&mut self, input: &str, encoding: SecretEncoding) -> Result<()> {
        let plaintext = decode_secret(input, encoding)?;
        self.set_plain_secret(plaintext.expose_secret())
    }

    /// Encrypt raw secret bytes into the record
    pub fn set_plain_secret(&mut self, plaintext: &[u8]) -> Result<()> {
        self.record.secret = self.provider.encrypt(plaintext, self.settings)?;
        self.secret_changed = true;
        Ok(())
    }

    pub fn secret_changed(&self) -> bool {
        self.secret_changed
    }

    pub(crate) fn into_record(self) -> TokenRecord {
        self.record
    }
}

impl Deref for TokenDraft<'_> {
    type Target = TokenRecord;

    fn deref(&self) -> &TokenRecord {
        &self.record
    }
}

impl DerefMut for TokenDraft<'_> {
    fn deref_mut(&mut self) -> &mut TokenRecord {
        &mut self.record
    }
}
