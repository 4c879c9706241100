// src/store/stream.rs
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use super::codec::{parse_line, RecordBuilder};
use crate::consts::KEY_TOKEN_NAME;
use crate::error::{Result, StoreError};
use crate::token::TokenRecord;

/// Forward-only reader yielding one decoded record at a time
///
/// A record that fails to decode is reported and skipped; only I/O errors
/// end the stream.
pub struct RecordStream {
    lines: Lines<BufReader<File>>,
    line_no: usize,
    /// `TokenName` line that opens the next record, with its line number
    pending: Option<(String, usize)>,
    failed: bool,
}

/// One record as it sits in the file, plus the outcome of decoding it
pub(crate) struct RawRecord {
    pub(crate) lines: Vec<String>,
    pub(crate) decoded: Result<TokenRecord>,
}

impl RecordStream {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let mut stream = Self {
            lines: BufReader::new(File::open(path)?).lines(),
            line_no: 0,
            pending: None,
            failed: false,
        };
        // header fields are handled by ConfigStore::read_header
        stream.read_body()?;
        Ok(stream)
    }

    /// Skip `count` records without decoding them
    pub(crate) fn skip_records(&mut self, count: usize) -> Result<()> {
        for skipped in 0..count {
            if self.pending.take().is_none() {
                return Err(StoreError::Format(format!(
                    "store ends after {skipped} record(s)"
                )));
            }
            self.read_body()?;
        }
        Ok(())
    }

    /// Yield raw records instead of decoded ones
    pub(crate) fn raw(self) -> RawRecords {
        RawRecords(self)
    }

    /// Lines up to the next `TokenName`, which is left pending
    fn read_body(&mut self) -> Result<Vec<(String, usize)>> {
        let mut body = Vec::new();
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            let opens_record = matches!(
                parse_line(&line, self.line_no),
                Ok(Some((KEY_TOKEN_NAME, _)))
            );
            if opens_record {
                self.pending = Some((line, self.line_no));
                return Ok(body);
            }
            body.push((line, self.line_no));
        }
        Ok(body)
    }

    fn next_raw(&mut self) -> Option<Result<RawRecord>> {
        if self.failed {
            return None;
        }
        let (first, first_no) = self.pending.take()?;
        let body = match self.read_body() {
            Ok(body) => body,
            Err(err) => {
                self.failed = true;
                return Some(Err(err));
            }
        };

        let decoded = decode_record(&first, first_no, &body);
        let mut lines = Vec::with_capacity(body.len() + 1);
        lines.push(first);
        lines.extend(body.into_iter().map(|(line, _)| line));
        Some(Ok(RawRecord { lines, decoded }))
    }
}

fn decode_record(first: &str, first_no: usize, body: &[(String, usize)]) -> Result<TokenRecord> {
    let name = match parse_line(first, first_no)? {
        Some((_, name)) => name,
        None => return Err(StoreError::Format(format!("line {first_no}: expected TokenName"))),
    };
    let mut builder = RecordBuilder::new(name);
    for (line, line_no) in body {
        if let Some((key, value)) = parse_line(line, *line_no)? {
            builder.field(key, value, *line_no)?;
        }
    }
    builder.finish()
}

impl Iterator for RecordStream {
    type Item = Result<TokenRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_raw()?.and_then(|raw| raw.decoded))
    }
}

/// [`RecordStream`] adapter that keeps each record's original lines
pub(crate) struct RawRecords(RecordStream);

impl Iterator for RawRecords {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_raw()
    }
}
