// src/iterator/mod.rs
//! Positional cursor over the token store: the only component that mutates it
//!
//! At most one decoded record lives in the iterator at a time (the `current`
//! slot). Mutations run a caller closure against a working copy first and only
//! touch the file when it returns [`MutationResult::Success`] and the result
//! validates. Every write either commits completely or leaves the file as it
//! was.

mod reorder;

use tracing::{debug, info, warn};

use reorder::MoveStream;

use crate::aliases::PlainSecret;
use crate::consts::CRYPTO_VERIFY_MARKER;
use crate::crypto::{rekey, CryptoProvider, CryptoSettings};
use crate::error::{Result, StoreError};
use crate::store::{ConfigHeader, ConfigStore, StoredRecord};
use crate::token::{TokenDraft, TokenRecord};

/// Verdict returned by a mutation callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationResult {
    Success,
    Cancelled,
    InvalidArguments,
    InvalidSecret,
}

pub struct TokenIterator<'p> {
    store: ConfigStore,
    provider: &'p dyn CryptoProvider,
    settings: CryptoSettings,
    current_index: Option<usize>,
    total_count: usize,
    current: Option<TokenRecord>,
}

impl<'p> TokenIterator<'p> {
    /// Wrap an opened store; counts records once and checks the key
    pub fn new(
        store: ConfigStore,
        provider: &'p dyn CryptoProvider,
        mut settings: CryptoSettings,
    ) -> Result<Self> {
        if let Some(on_disk) = store.header().crypto_version {
            if on_disk != settings.version {
                debug!(?on_disk, requested = ?settings.version, "using crypto version from header");
                settings.version = on_disk;
            }
        }
        if let Some(verify) = &store.header().crypto_verify {
            let decrypted = provider.decrypt(verify, &settings)?;
            if decrypted.expose_secret().as_slice() != CRYPTO_VERIFY_MARKER {
                return Err(StoreError::Crypto("key verification failed".into()));
            }
        }

        let total_count = store.count_records()?;
        debug!(total_count, path = %store.path().display(), "token iterator ready");
        Ok(Self {
            store,
            provider,
            settings,
            current_index: None,
            total_count,
            current: None,
        })
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Record loaded by the last successful `go_to`
    pub fn current(&self) -> Option<&TokenRecord> {
        self.current.as_ref()
    }

    /// Load record `index` into the slot; on failure nothing changes
    pub fn go_to(&mut self, index: usize) -> bool {
        match self.load(index) {
            Ok(()) => true,
            Err(err) => {
                warn!(index, %err, "go_to failed");
                false
            }
        }
    }

    fn load(&mut self, index: usize) -> Result<()> {
        if index >= self.total_count {
            return Err(StoreError::Validation(format!(
                "index {index} out of range (total {})",
                self.total_count
            )));
        }
        let record = self.store.read_record_at(index)?;
        self.current = Some(record);
        self.current_index = Some(index);
        Ok(())
    }

    /// Decrypt the current record's secret
    pub fn current_secret(&self) -> Result<PlainSecret> {
        let record = self.require_current()?.1;
        self.provider.decrypt(&record.secret, &self.settings)
    }

    /// Build a new token through `mutate` and append it on success
    ///
    /// `Ok` with a non-success verdict means the file was not touched.
    /// `Err` means persisting failed; count and position are unchanged.
    pub fn add_new_token<F>(&mut self, mutate: F) -> Result<MutationResult>
    where
        F: FnOnce(&mut TokenDraft<'_>) -> MutationResult,
    {
        let target = self.settings.upgraded();
        let mut draft = TokenDraft::new(TokenRecord::blank(), self.provider, &target);
        let verdict = mutate(&mut draft);
        if verdict != MutationResult::Success {
            debug!(?verdict, "add_new_token: callback did not succeed");
            return Ok(verdict);
        }
        let record = draft.into_record();
        if let Some(rejected) = rejection(&record) {
            return Ok(rejected);
        }

        if self.settings.needs_migration() {
            let records = self.source_records()?;
            self.commit(records)?;
        }
        self.store.append_record(&record)?;

        let index = self.total_count;
        self.total_count += 1;
        self.current_index = Some(index);
        info!(index, token = %record.name, "token added");
        self.current = Some(record);
        Ok(MutationResult::Success)
    }

    /// Edit the current token through `mutate` and persist on success
    ///
    /// If persisting fails the current slot is dropped as stale and the
    /// caller must `go_to` again.
    pub fn update_current_token<F>(&mut self, mutate: F) -> Result<MutationResult>
    where
        F: FnOnce(&mut TokenDraft<'_>) -> MutationResult,
    {
        let (index, snapshot) = self.require_current()?;
        let original_secret = snapshot.secret.clone();
        let target = self.settings.upgraded();
        let mut draft = TokenDraft::new(snapshot.clone(), self.provider, &target);
        let verdict = mutate(&mut draft);
        if verdict != MutationResult::Success {
            debug!(index, ?verdict, "update_current_token: callback did not succeed");
            return Ok(verdict);
        }
        let working = draft.into_record();
        if let Some(rejected) = rejection(&working) {
            return Ok(rejected);
        }

        let secret_changed = working.secret != original_secret;
        match self.persist_update(index, working, secret_changed) {
            Ok(record) => {
                info!(index, token = %record.name, secret_changed, "token updated");
                self.current = Some(record);
                Ok(MutationResult::Success)
            }
            Err(err) => {
                warn!(index, %err, "token update failed, current record is stale");
                self.current = None;
                Err(err)
            }
        }
    }

    fn persist_update(
        &mut self,
        index: usize,
        working: TokenRecord,
        secret_changed: bool,
    ) -> Result<TokenRecord> {
        // a fresh secret is already in target form
        let working = if secret_changed {
            working
        } else {
            self.to_target(working)?
        };

        if secret_changed || self.settings.needs_migration() {
            let replacement = StoredRecord::Decoded(working.clone());
            let records = self.source_records()?.enumerate().map(move |(i, record)| {
                if i == index {
                    Ok(replacement.clone())
                } else {
                    record
                }
            });
            self.commit(records)?;
        } else {
            self.store.update_record_fields(index, &working)?;
        }
        Ok(working)
    }

    /// Move the current token to `new_index`, shifting the ones in between
    pub fn move_current_token_info(&mut self, new_index: usize) -> Result<()> {
        let (from, current) = self.require_current()?;
        if new_index >= self.total_count {
            return Err(StoreError::Validation(format!(
                "target index {new_index} out of range (total {})",
                self.total_count
            )));
        }
        if new_index == from {
            return Ok(());
        }

        let moved = self.to_target(current.clone())?;
        let records = MoveStream::new(
            self.source_records()?,
            from,
            new_index,
            StoredRecord::Decoded(moved.clone()),
        );
        self.commit(records)?;

        info!(from, to = new_index, token = %moved.name, "token moved");
        self.current_index = Some(new_index);
        self.current = Some(moved);
        Ok(())
    }

    /// Delete the current token; later tokens shift down by one
    ///
    /// Afterwards the iterator sits on the token that took the removed slot
    /// (or the new last one), or is detached if the store is now empty.
    /// On error the file, count and position are unchanged.
    pub fn remove_current_token_info(&mut self) -> Result<()> {
        let (index, _) = self.require_current()?;
        self.remove_at(index)
    }

    /// Delete the token at `index` once `confirm` agrees
    ///
    /// `confirm` sees the record at `index`, or `None` if it cannot be
    /// decoded. Returns `Ok(false)` when declined. Unless the removal
    /// succeeds the iterator is returned to the position it had before.
    pub fn remove_token_at<F>(&mut self, index: usize, confirm: F) -> Result<bool>
    where
        F: FnOnce(Option<&TokenRecord>) -> bool,
    {
        if index >= self.total_count {
            return Err(StoreError::Validation(format!(
                "index {index} out of range (total {})",
                self.total_count
            )));
        }
        let previous = self.current_index;
        let readable = self.go_to(index);
        let candidate = if readable { self.current.as_ref() } else { None };
        if !confirm(candidate) {
            debug!(index, "removal declined");
            self.restore(previous);
            return Ok(false);
        }
        match self.remove_at(index) {
            Ok(()) => Ok(true),
            Err(err) => {
                self.restore(previous);
                Err(err)
            }
        }
    }

    fn remove_at(&mut self, index: usize) -> Result<()> {
        let records = self
            .source_records()?
            .enumerate()
            .filter_map(move |(i, record)| (i != index).then_some(record));
        let written = self.commit(records)?;

        let expected = self.total_count - 1;
        if written != expected {
            warn!(written, expected, "record count drifted during remove");
        }
        self.total_count = written;
        self.detach();
        info!(index, "token removed");

        if self.total_count > 0 {
            self.go_to(index.min(self.total_count - 1));
        }
        Ok(())
    }

    fn restore(&mut self, previous: Option<usize>) {
        match previous {
            Some(index) if self.go_to(index) => {}
            _ => self.detach(),
        }
    }

    fn detach(&mut self) {
        self.current = None;
        self.current_index = None;
    }

    /// Re-encrypt every secret for a new key slot / IV in one atomic rewrite
    pub fn rekey_all(&mut self, new_settings: CryptoSettings) -> Result<()> {
        let new_settings = new_settings.upgraded();
        let records = self.stored_records(Some(new_settings))?;

        let mut header = self.store.header().clone();
        header.apply_settings(
            &new_settings,
            self.provider.encrypt(CRYPTO_VERIFY_MARKER, &new_settings)?,
        );
        self.store.rewrite_entries(header, records)?;
        self.settings = new_settings;
        info!(key_slot = new_settings.key_slot, "store re-keyed");

        if let Some(index) = self.current_index {
            self.current = None;
            self.go_to(index);
        }
        Ok(())
    }

    /// Release the store handle and the record slot
    pub fn free(self) {
        debug!(path = %self.store.path().display(), "token iterator released");
    }

    fn require_current(&self) -> Result<(usize, &TokenRecord)> {
        match (self.current_index, self.current.as_ref()) {
            (Some(index), Some(record)) => Ok((index, record)),
            _ => Err(StoreError::Validation(
                "no current token, call go_to first".into(),
            )),
        }
    }

    /// Records in file order, re-encrypted when a crypto migration is pending
    fn source_records(&self) -> Result<impl Iterator<Item = Result<StoredRecord>> + 'p> {
        let target = self
            .settings
            .needs_migration()
            .then(|| self.settings.upgraded());
        self.stored_records(target)
    }

    /// Records in file order, re-encrypted for `to` if given
    ///
    /// Records that do not decode are passed through as their original lines.
    fn stored_records(
        &self,
        to: Option<CryptoSettings>,
    ) -> Result<impl Iterator<Item = Result<StoredRecord>> + 'p> {
        let provider = self.provider;
        let from = self.settings;
        Ok(self.store.records()?.raw().enumerate().map(move |(index, raw)| {
            let raw = raw?;
            match raw.decoded {
                Ok(mut record) => {
                    if let Some(to) = &to {
                        record.secret = rekey(provider, &record.secret, &from, to)?;
                    }
                    Ok(StoredRecord::Decoded(record))
                }
                Err(err) => {
                    warn!(index, %err, "keeping unreadable record as is");
                    Ok(StoredRecord::Verbatim(raw.lines))
                }
            }
        }))
    }

    /// Bring an in-memory record into the form `commit` will write
    fn to_target(&self, mut record: TokenRecord) -> Result<TokenRecord> {
        if self.settings.needs_migration() {
            record.secret = rekey(
                self.provider,
                &record.secret,
                &self.settings,
                &self.settings.upgraded(),
            )?;
        }
        Ok(record)
    }

    /// Atomically replace all records; completes any pending crypto migration
    fn commit<I>(&mut self, records: I) -> Result<usize>
    where
        I: Iterator<Item = Result<StoredRecord>>,
    {
        let header = self.target_header()?;
        let written = self.store.rewrite_entries(header, records)?;
        if self.settings.needs_migration() {
            info!(from = ?self.settings.version, "secrets migrated to current crypto version");
            self.settings = self.settings.upgraded();
        }
        Ok(written)
    }

    fn target_header(&self) -> Result<ConfigHeader> {
        let mut header = self.store.header().clone();
        if self.settings.needs_migration() {
            let target = self.settings.upgraded();
            header.apply_settings(&target, self.provider.encrypt(CRYPTO_VERIFY_MARKER, &target)?);
        }
        Ok(header)
    }
}

/// Local checks run after a successful callback, before any I/O
fn rejection(record: &TokenRecord) -> Option<MutationResult> {
    match record.validate() {
        Ok(()) => None,
        Err(err) => {
            warn!(%err, "token rejected before write");
            if record.secret.is_empty() {
                Some(MutationResult::InvalidSecret)
            } else {
                Some(MutationResult::InvalidArguments)
            }
        }
    }
}
