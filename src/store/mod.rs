// src/store/mod.rs
//! Config file access: header, positional records, crash-safe writes
//!
//! The file is the single source of truth. Records are addressed by their
//! ordinal position; nothing here keeps more than one decoded record alive.

mod codec;
mod file_ops;
mod header;
mod stream;

pub use header::ConfigHeader;
pub use stream::RecordStream;

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use codec::{encode_record, is_record_key, parse_line, write_record, write_verbatim};
use file_ops::{append_with_rollback, write_atomically};

use crate::consts::{CRYPTO_VERIFY_MARKER, KEY_TOKEN_NAME};
use crate::crypto::{CryptoProvider, CryptoSettings};
use crate::error::{Result, StoreError};
use crate::token::TokenRecord;

/// What a full rewrite writes back into one ordinal slot
#[derive(Debug, Clone)]
pub(crate) enum StoredRecord {
    Decoded(TokenRecord),
    /// Lines of a record that does not decode, copied through unchanged
    Verbatim(Vec<String>),
}

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    header: ConfigHeader,
}

impl ConfigStore {
    /// Open a store that already exists and validate its header
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut store = Self {
            path: path.as_ref().to_path_buf(),
            header: ConfigHeader::empty(),
        };
        store.read_header()?;
        debug!(path = %store.path.display(), "store opened");
        Ok(store)
    }

    /// Create a new, empty store; fails if `path` already exists
    pub fn create_new<P: AsRef<Path>>(
        path: P,
        provider: &dyn CryptoProvider,
        settings: &CryptoSettings,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // claim the name first so an existing store is never clobbered
        File::options().write(true).create_new(true).open(&path)?;

        let verify = provider.encrypt(CRYPTO_VERIFY_MARKER, settings)?;
        let header = ConfigHeader::new(&settings.upgraded(), verify);
        let written = write_atomically(&path, |out| Ok(header.write_to(out)?));
        if let Err(err) = written {
            let _ = std::fs::remove_file(&path);
            return Err(err);
        }

        info!(path = %path.display(), key_slot = settings.key_slot, "store created");
        Ok(Self { path, header })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &ConfigHeader {
        &self.header
    }

    /// Re-read and validate the header fields from disk
    pub fn read_header(&mut self) -> Result<&ConfigHeader> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut header = ConfigHeader::empty();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            match parse_line(&line, line_no + 1)? {
                Some((KEY_TOKEN_NAME, _)) => break,
                Some((key, value)) => header.set_field(key, value, line_no + 1)?,
                None => {}
            }
        }
        header.validate()?;
        self.header = header;
        Ok(&self.header)
    }

    /// Count records by their `TokenName` lines, without decoding them
    pub fn count_records(&self) -> Result<usize> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut count = 0;
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            // a malformed line belongs to its record and does not stop the count
            if let Ok(Some((KEY_TOKEN_NAME, _))) = parse_line(&line, line_no + 1) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// All records in file order, decoded one at a time
    pub fn records(&self) -> Result<RecordStream> {
        RecordStream::open(&self.path)
    }

    /// Decode the record at ordinal `index`
    pub fn read_record_at(&self, index: usize) -> Result<TokenRecord> {
        let mut stream = self.records()?;
        stream.skip_records(index)?;
        stream
            .next()
            .unwrap_or_else(|| Err(StoreError::Format(format!("no record at index {index}"))))
    }

    /// Add one record at the end of the file
    pub fn append_record(&mut self, record: &TokenRecord) -> Result<()> {
        append_with_rollback(&self.path, &encode_record(record))?;
        debug!(token = %record.name, "record appended");
        Ok(())
    }

    /// Replace the known fields of record `index`, copying everything else verbatim
    pub fn update_record_fields(&mut self, index: usize, record: &TokenRecord) -> Result<()> {
        let source = BufReader::new(File::open(&self.path)?);
        write_atomically(&self.path, |out| {
            let mut seen = 0usize;
            let mut in_target = false;
            for (line_no, line) in source.lines().enumerate() {
                let line = line?;
                let entry = parse_line(&line, line_no + 1)?;
                if let Some((KEY_TOKEN_NAME, _)) = entry {
                    in_target = seen == index;
                    seen += 1;
                    if in_target {
                        write_record(out, record)?;
                        continue;
                    }
                }
                if in_target && entry.is_some_and(|(key, _)| is_record_key(key)) {
                    continue;
                }
                writeln!(out, "{line}")?;
            }
            if index >= seen {
                return Err(StoreError::Format(format!(
                    "no record at index {index} (store has {seen})"
                )));
            }
            Ok(())
        })?;
        debug!(index, token = %record.name, "record updated in place");
        Ok(())
    }

    /// Replace every record, keeping the current header
    pub fn rewrite_all<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<TokenRecord>>,
    {
        let header = self.header.clone();
        self.rewrite_with_header(header, records)
    }

    /// Replace header and records in one atomic step
    ///
    /// The first `Err` yielded by `records` aborts the rewrite and leaves the
    /// committed file untouched. Returns the number of records written.
    pub fn rewrite_with_header<I>(&mut self, header: ConfigHeader, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<TokenRecord>>,
    {
        let entries = records
            .into_iter()
            .map(|record| record.map(StoredRecord::Decoded));
        self.rewrite_entries(header, entries)
    }

    /// Same as [`ConfigStore::rewrite_with_header`], allowing verbatim records
    pub(crate) fn rewrite_entries<I>(&mut self, header: ConfigHeader, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<StoredRecord>>,
    {
        header.validate()?;
        let mut written = 0usize;
        let mut verbatim = 0usize;
        write_atomically(&self.path, |out| {
            header.write_to(out)?;
            for entry in entries {
                match entry? {
                    StoredRecord::Decoded(record) => write_record(out, &record)?,
                    StoredRecord::Verbatim(lines) => {
                        write_verbatim(out, &lines)?;
                        verbatim += 1;
                    }
                }
                written += 1;
            }
            Ok(())
        })?;
        self.header = header;
        info!(path = %self.path.display(), records = written, verbatim, "store rewritten");
        Ok(written)
    }

    /// Replace only the header, copying record lines verbatim
    pub fn rewrite_header(&mut self, header: ConfigHeader) -> Result<()> {
        header.validate()?;
        let source = BufReader::new(File::open(&self.path)?);
        write_atomically(&self.path, |out| {
            header.write_to(out)?;
            let mut in_records = false;
            for (line_no, line) in source.lines().enumerate() {
                let line = line?;
                if !in_records {
                    in_records =
                        matches!(parse_line(&line, line_no + 1)?, Some((KEY_TOKEN_NAME, _)));
                }
                if in_records {
                    writeln!(out, "{line}")?;
                }
            }
            Ok(())
        })?;
        self.header = header;
        Ok(())
    }
}
