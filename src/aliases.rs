// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret holders used throughout the token store.

pub use secure_gate::{dynamic_alias, fixed_alias};

// Fixed-size secrets
fixed_alias!(SlotKey32, 32); // 256-bit key resident in one key slot

// Dynamic secrets
dynamic_alias!(PlainSecret, Vec<u8>); // decoded TOTP/HOTP secret, never persisted
