// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Rejected before any I/O took place
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Config format error: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crypto operation failed: {0}")]
    Crypto(String),
}

impl StoreError {
    /// True when the error was raised locally and the store was never touched
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

impl From<tempfile::PersistError> for StoreError {
    fn from(err: tempfile::PersistError) -> Self {
        StoreError::Io(err.error)
    }
}

impl From<aes_gcm::aead::Error> for StoreError {
    fn from(_: aes_gcm::aead::Error) -> Self {
        // aead::Error is deliberately opaque
        StoreError::Crypto("authentication failed".into())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
