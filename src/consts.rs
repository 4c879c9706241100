// src/consts.rs
//! Shared constants: file format tags, crypto parameters and token defaults

use std::ops::RangeInclusive;

/// File-type tag written as the first header line
pub const CONFIG_FILE_TYPE: &str = "TOTP token store";

/// Config format version understood by this crate
pub const CONFIG_FILE_VERSION: u32 = 2;

/// Key slots a caller may select for secret encryption
pub const ACCEPTABLE_KEY_SLOTS: RangeInclusive<u8> = 12..=100;

/// Slot used when none is configured
pub const DEFAULT_KEY_SLOT: u8 = 12;

/// Length of the base initialization vector
pub const IV_LENGTH: usize = 16;

/// AEAD nonce length shared by both cipher versions
pub const NONCE_LENGTH: usize = 12;

/// AEAD tag length shared by both cipher versions
pub const TAG_LENGTH: usize = 16;

/// Known plaintext encrypted into the header to detect a wrong key
pub const CRYPTO_VERIFY_MARKER: &[u8] = b"totp-token-store/verify";

/// Context string for per-slot key derivation
pub const KEY_DERIVE_CONTEXT: &str = "totp-token-store 2025 key-slot derivation";

/// Default TOTP step in seconds
pub const DEFAULT_TOKEN_DURATION: u32 = 30;

/// Default config file name, resolved under the platform config dir
pub const DEFAULT_TOKEN_FILE_NAME: &str = "totp.conf";

// Header keys
pub const KEY_FILETYPE: &str = "Filetype";
pub const KEY_VERSION: &str = "Version";
pub const KEY_CRYPTO_VERSION: &str = "CryptoVersion";
pub const KEY_CRYPTO_KEY_SLOT: &str = "CryptoKeySlot";
pub const KEY_BASE_IV: &str = "BaseIV";
pub const KEY_CRYPTO_VERIFY: &str = "CryptoVerify";

// Token record keys
pub const KEY_TOKEN_NAME: &str = "TokenName";
pub const KEY_TOKEN_SECRET: &str = "TokenSecret";
pub const KEY_TOKEN_ALGO: &str = "TokenAlgo";
pub const KEY_TOKEN_DIGITS: &str = "TokenDigits";
pub const KEY_TOKEN_TYPE: &str = "TokenType";
pub const KEY_TOKEN_DURATION: &str = "TokenDuration";
pub const KEY_TOKEN_COUNTER: &str = "TokenCounter";
pub const KEY_TOKEN_AUTOMATION: &str = "TokenAutomationFeatures";
