// src/token/mod.rs
//! Token data model
//!
//! A [`TokenRecord`] is what one config file record decodes to. Its secret is
//! always ciphertext; plaintext only appears inside a [`TokenDraft`] while a
//! mutation callback runs.

mod draft;
mod record;
mod secret;

pub use draft::TokenDraft;
pub use record::{TokenKind, TokenRecord};
pub use secret::decode_secret;
