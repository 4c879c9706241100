// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for the small value types a token record is made of:
//! hash algorithm, digit count, token kind, automation flags, plus the
//! secret presentation encodings and crypto versions.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// HMAC hash algorithm of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenAlgo {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl TokenAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenAlgo::Sha1 => "sha1",
            TokenAlgo::Sha256 => "sha256",
            TokenAlgo::Sha512 => "sha512",
        }
    }
}

impl FromStr for TokenAlgo {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(TokenAlgo::Sha1),
            "sha256" => Ok(TokenAlgo::Sha256),
            "sha512" => Ok(TokenAlgo::Sha512),
            other => Err(StoreError::Validation(format!(
                "unknown algorithm '{other}'"
            ))),
        }
    }
}

impl fmt::Display for TokenAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Number of digits in a generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TokenDigits {
    #[default]
    Six,
    Eight,
}

impl TokenDigits {
    pub fn count(&self) -> u8 {
        match self {
            TokenDigits::Six => 6,
            TokenDigits::Eight => 8,
        }
    }
}

impl TryFrom<u8> for TokenDigits {
    type Error = StoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            6 => Ok(TokenDigits::Six),
            8 => Ok(TokenDigits::Eight),
            other => Err(StoreError::Validation(format!(
                "digits must be 6 or 8, got {other}"
            ))),
        }
    }
}

impl FromStr for TokenDigits {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| StoreError::Validation(format!("digits '{s}' is not a number")))?;
        TokenDigits::try_from(value)
    }
}

/// Time-based or counter-based token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    #[default]
    Totp,
    Hotp,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Totp => "totp",
            TokenType::Hotp => "hotp",
        }
    }
}

impl FromStr for TokenType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "totp" => Ok(TokenType::Totp),
            "hotp" => Ok(TokenType::Hotp),
            other => Err(StoreError::Validation(format!(
                "unknown token type '{other}'"
            ))),
        }
    }
}

/// Keystroke automation applied after a code is typed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutomationFeatures(u8);

impl AutomationFeatures {
    pub const NONE: Self = Self(0);
    pub const ENTER_AT_END: Self = Self(0b001);
    pub const TAB_AT_END: Self = Self(0b010);
    pub const TYPE_SLOWER: Self = Self(0b100);

    const NAMED: [(Self, &'static str); 3] = [
        (Self::ENTER_AT_END, "enter"),
        (Self::TAB_AT_END, "tab"),
        (Self::TYPE_SLOWER, "slower"),
    ];

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Space-separated tokens as written to the config file
    pub fn to_tokens(&self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BitOr for AutomationFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AutomationFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromStr for AutomationFeatures {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut features = AutomationFeatures::NONE;
        for token in s.split(|c: char| c.is_whitespace() || c == ',') {
            match token.trim().to_ascii_lowercase().as_str() {
                "" | "none" => {}
                "enter" => features |= AutomationFeatures::ENTER_AT_END,
                "tab" => features |= AutomationFeatures::TAB_AT_END,
                "slower" => features |= AutomationFeatures::TYPE_SLOWER,
                other => {
                    return Err(StoreError::Validation(format!(
                        "unknown automation feature '{other}'"
                    )))
                }
            }
        }
        Ok(features)
    }
}

/// Presentation encoding of a user-entered secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretEncoding {
    #[default]
    Base32,
    Base64,
}

/// Secret encryption scheme version
///
/// Older versions stay decryptable; every write uses [`CryptoVersion::CURRENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CryptoVersion {
    /// ChaCha20-Poly1305, nonce taken from the base IV
    V1,
    /// AES-256-GCM, synthetic nonce bound to the plaintext
    V2,
}

impl CryptoVersion {
    pub const CURRENT: CryptoVersion = CryptoVersion::V2;

    pub fn as_u8(&self) -> u8 {
        match self {
            CryptoVersion::V1 => 1,
            CryptoVersion::V2 => 2,
        }
    }
}

impl TryFrom<u8> for CryptoVersion {
    type Error = StoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CryptoVersion::V1),
            2 => Ok(CryptoVersion::V2),
            other => Err(StoreError::Crypto(format!(
                "unsupported crypto version {other}"
            ))),
        }
    }
}
