// src/export/json.rs
use std::path::Path;

use chrono::Utc;
use data_encoding::BASE32_NOPAD;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::enums::{AutomationFeatures, TokenAlgo, TokenType};
use crate::error::{Result, StoreError};
use crate::iterator::TokenIterator;

/// One token as it appears in an export file
#[derive(Debug, Clone, Serialize)]
pub struct ExportedToken {
    pub index: usize,
    pub name: String,
    pub secret_base32: String,
    pub algorithm: TokenAlgo,
    pub digits: u8,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<u64>,
    pub automation: AutomationFeatures,
}

/// Export every token, with its decrypted secret, to a portable JSON file.
///
/// SECURITY WARNING: the output holds every secret in cleartext.
/// Walks the store with `go_to`, so only one record is decoded at a time; the
/// iterator is left positioned where it was.
pub fn export_to_json<P: AsRef<Path>>(
    iter: &mut TokenIterator<'_>,
    path: P,
    allow_plaintext_export: bool,
) -> Result<Vec<ExportedToken>> {
    if !allow_plaintext_export {
        return Err(StoreError::Validation(
            "plaintext export is disabled in the configuration".into(),
        ));
    }

    let previous = iter.current_index();
    let mut tokens = Vec::with_capacity(iter.total_count());
    for index in 0..iter.total_count() {
        if !iter.go_to(index) {
            return Err(StoreError::Format(format!("token {index} is unreadable")));
        }
        let secret = iter.current_secret()?;
        let Some(record) = iter.current() else {
            continue;
        };
        tokens.push(ExportedToken {
            index,
            name: record.name.clone(),
            secret_base32: BASE32_NOPAD.encode(secret.expose_secret()),
            algorithm: record.algo,
            digits: record.digits.count(),
            token_type: record.token_type(),
            duration: record.duration(),
            counter: record.counter(),
            automation: record.automation_features,
        });
    }
    if let Some(index) = previous {
        iter.go_to(index);
    }

    let export = json!({
        "export_format": "totp-token-store-v1",
        "exported_at": Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        "exporter_version": env!("CARGO_PKG_VERSION"),
        "total_tokens": tokens.len(),
        "warning": "THIS FILE CONTAINS ALL TOKEN SECRETS IN PLAINTEXT. ENCRYPT OR DELETE IMMEDIATELY AFTER USE.",
        "tokens": tokens,
    });

    let body = serde_json::to_string_pretty(&export)
        .map_err(|e| StoreError::Format(format!("export serialization failed: {e}")))?;
    std::fs::write(path.as_ref(), body)?;
    info!(count = tokens.len(), path = %path.as_ref().display(), "tokens exported");
    warn!("export file holds plaintext secrets");

    Ok(tokens)
}
