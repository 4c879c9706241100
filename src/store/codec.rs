// src/store/codec.rs
//! Line-level encoding of the config file
//!
//! Every meaningful line is `Key: Value`. Blank lines and `#` comments are
//! skipped. A record begins at its `TokenName` line and runs until the next
//! one or EOF.

use std::io::Write;

use tracing::warn;

use crate::consts::*;
use crate::enums::{AutomationFeatures, TokenAlgo, TokenDigits, TokenType};
use crate::error::{Result, StoreError};
use crate::token::{TokenKind, TokenRecord};

/// Split one line into key and value; `None` for blanks and comments
pub(crate) fn parse_line(line: &str, line_no: usize) -> Result<Option<(&str, &str)>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (key, value) = trimmed
        .split_once(':')
        .ok_or_else(|| StoreError::Format(format!("line {line_no}: expected 'Key: Value'")))?;
    Ok(Some((key.trim(), value.trim())))
}

pub(crate) fn write_field(out: &mut dyn Write, key: &str, value: &str) -> std::io::Result<()> {
    writeln!(out, "{key}: {value}")
}

/// Keys owned by a token record; anything else inside a record is foreign
pub(crate) fn is_record_key(key: &str) -> bool {
    matches!(
        key,
        KEY_TOKEN_NAME
            | KEY_TOKEN_SECRET
            | KEY_TOKEN_ALGO
            | KEY_TOKEN_DIGITS
            | KEY_TOKEN_TYPE
            | KEY_TOKEN_DURATION
            | KEY_TOKEN_COUNTER
            | KEY_TOKEN_AUTOMATION
    )
}

pub(crate) fn write_record(out: &mut dyn Write, record: &TokenRecord) -> std::io::Result<()> {
    write_field(out, KEY_TOKEN_NAME, &record.name)?;
    write_field(out, KEY_TOKEN_SECRET, &hex::encode(&record.secret))?;
    write_field(out, KEY_TOKEN_ALGO, record.algo.as_str())?;
    write_field(out, KEY_TOKEN_DIGITS, &record.digits.count().to_string())?;
    write_field(out, KEY_TOKEN_TYPE, record.token_type().as_str())?;
    match record.kind {
        TokenKind::Totp { duration } => {
            write_field(out, KEY_TOKEN_DURATION, &duration.to_string())?
        }
        TokenKind::Hotp { counter } => write_field(out, KEY_TOKEN_COUNTER, &counter.to_string())?,
    }
    write_field(
        out,
        KEY_TOKEN_AUTOMATION,
        &record.automation_features.to_tokens(),
    )
}

/// Write lines exactly as they were read
pub(crate) fn write_verbatim(out: &mut dyn Write, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub(crate) fn encode_record(record: &TokenRecord) -> Vec<u8> {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_record(&mut buf, record);
    buf
}

/// Accumulates the fields of one record while it is streamed in
pub(crate) struct RecordBuilder {
    name: String,
    secret: Option<Vec<u8>>,
    algo: TokenAlgo,
    digits: TokenDigits,
    token_type: TokenType,
    duration: Option<u32>,
    counter: Option<u64>,
    automation: AutomationFeatures,
}

impl RecordBuilder {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            secret: None,
            algo: TokenAlgo::default(),
            digits: TokenDigits::default(),
            token_type: TokenType::default(),
            duration: None,
            counter: None,
            automation: AutomationFeatures::NONE,
        }
    }

    /// Apply one field. Only the secret is strict; the rest fall back to defaults.
    pub(crate) fn field(&mut self, key: &str, value: &str, line_no: usize) -> Result<()> {
        match key {
            KEY_TOKEN_SECRET => {
                let bytes = hex::decode(value).map_err(|_| {
                    StoreError::Format(format!("line {line_no}: TokenSecret is not hex"))
                })?;
                self.secret = Some(bytes);
            }
            KEY_TOKEN_ALGO => self.algo = or_default(value.parse(), &self.name, key),
            KEY_TOKEN_DIGITS => self.digits = or_default(value.parse(), &self.name, key),
            KEY_TOKEN_TYPE => self.token_type = or_default(value.parse(), &self.name, key),
            KEY_TOKEN_DURATION => match value.parse::<u32>() {
                Ok(duration) if duration > 0 => self.duration = Some(duration),
                _ => warn!(token = %self.name, value, "invalid TokenDuration, using default"),
            },
            KEY_TOKEN_COUNTER => match value.parse::<u64>() {
                Ok(counter) => self.counter = Some(counter),
                Err(_) => warn!(token = %self.name, value, "invalid TokenCounter, using 0"),
            },
            KEY_TOKEN_AUTOMATION => {
                self.automation = or_default(value.parse(), &self.name, key)
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<TokenRecord> {
        if self.name.is_empty() {
            return Err(StoreError::Format("record with empty TokenName".into()));
        }
        let secret = self.secret.ok_or_else(|| {
            StoreError::Format(format!("record '{}' has no TokenSecret", self.name))
        })?;
        let kind = match self.token_type {
            TokenType::Totp => TokenKind::Totp {
                duration: self.duration.unwrap_or(DEFAULT_TOKEN_DURATION),
            },
            TokenType::Hotp => TokenKind::Hotp {
                counter: self.counter.unwrap_or(0),
            },
        };
        Ok(TokenRecord {
            name: self.name,
            secret,
            algo: self.algo,
            digits: self.digits,
            kind,
            automation_features: self.automation,
        })
    }
}

fn or_default<T: Default>(parsed: Result<T>, token: &str, key: &str) -> T {
    parsed.unwrap_or_else(|err| {
        warn!(token, key, %err, "field degraded to default");
        T::default()
    })
}
