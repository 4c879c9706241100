// src/lib.rs
//! totp-token-store: an encrypted, positional store of TOTP/HOTP secrets
//!
//! Features:
//! - Line-oriented config file, one record per token, ordinal = index
//! - Secrets encrypted per key slot (AES-256-GCM, ChaCha20-Poly1305 legacy)
//! - Positional iterator with add / update / move / remove
//! - Atomic rewrites: a failed write never leaves a truncated store
//! - secure-gate zeroizing secret holders

pub mod aliases;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod enums;
pub mod export;
pub mod format;
pub mod iterator;
pub mod store;
pub mod token;

pub mod error;

// Re-export everything users need at the crate root
pub use aliases::{PlainSecret, SlotKey32};
pub use config::load as load_config;
pub use crypto::{CryptoProvider, CryptoSettings, Keyring};
pub use enums::{
    AutomationFeatures, CryptoVersion, SecretEncoding, TokenAlgo, TokenDigits, TokenType,
};
pub use error::{Result, StoreError};
pub use export::export_to_json;
pub use format::{list_tokens, OutputStyle};
pub use iterator::{MutationResult, TokenIterator};
pub use store::{ConfigHeader, ConfigStore};
pub use token::{TokenDraft, TokenKind, TokenRecord};
