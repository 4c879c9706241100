// src/token/record.rs
use crate::consts::DEFAULT_TOKEN_DURATION;
use crate::enums::{AutomationFeatures, TokenAlgo, TokenDigits, TokenType};
use crate::error::{Result, StoreError};

/// Type-specific moving factor; only the one matching the token type exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Totp { duration: u32 },
    Hotp { counter: u64 },
}

impl Default for TokenKind {
    fn default() -> Self {
        TokenKind::Totp {
            duration: DEFAULT_TOKEN_DURATION,
        }
    }
}

/// One token as persisted in the config file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenRecord {
    pub name: String,
    /// Ciphertext produced by the crypto provider
    pub secret: Vec<u8>,
    pub algo: TokenAlgo,
    pub digits: TokenDigits,
    pub kind: TokenKind,
    pub automation_features: AutomationFeatures,
}

impl TokenRecord {
    /// Blank record: no name, no secret, SHA1 / 6 digits / TOTP 30s
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn token_type(&self) -> TokenType {
        match self.kind {
            TokenKind::Totp { .. } => TokenType::Totp,
            TokenKind::Hotp { .. } => TokenType::Hotp,
        }
    }

    pub fn duration(&self) -> Option<u32> {
        match self.kind {
            TokenKind::Totp { duration } => Some(duration),
            TokenKind::Hotp { .. } => None,
        }
    }

    pub fn counter(&self) -> Option<u64> {
        match self.kind {
            TokenKind::Hotp { counter } => Some(counter),
            TokenKind::Totp { .. } => None,
        }
    }

    /// Switch type, resetting the moving factor to that type's default
    pub fn set_type(&mut self, token_type: TokenType) {
        if self.token_type() == token_type {
            return;
        }
        self.kind = match token_type {
            TokenType::Totp => TokenKind::default(),
            TokenType::Hotp => TokenKind::Hotp { counter: 0 },
        };
    }

    /// Trim and validate a display name, then store it
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        validate_name(name)?;
        self.name = name.to_string();
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.secret.is_empty() {
            return Err(StoreError::Validation("token secret is empty".into()));
        }
        if let TokenKind::Totp { duration: 0 } = self.kind {
            return Err(StoreError::Validation("duration must be > 0".into()));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation("token name is empty".into()));
    }
    if name.trim() != name {
        return Err(StoreError::Validation(
            "token name has surrounding whitespace".into(),
        ));
    }
    // one record field per line
    if name.chars().any(char::is_control) {
        return Err(StoreError::Validation(
            "token name contains control characters".into(),
        ));
    }
    Ok(())
}
