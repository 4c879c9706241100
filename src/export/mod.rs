// src/export/mod.rs
//! Export utilities for the token store
//!
//! Exports contain every secret in plaintext (Base32). Callers must opt in.

pub use json::{export_to_json, ExportedToken};

pub mod json;
