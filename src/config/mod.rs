// src/config/mod.rs
//! Configuration system for the token store
//!
//! TOML file + env overrides, falling back to built-in defaults.

pub use app::{load, load_from, Config, CryptoConfig, Features, Paths};

mod app;
mod defaults;
