// tests/support.rs
//! Store fixtures: a temp dir holding one token file plus a known keyring

use std::cell::Cell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use totp_token_store::consts::CRYPTO_VERIFY_MARKER;
use totp_token_store::crypto::encrypt_v1;
use totp_token_store::{
    ConfigStore, CryptoProvider, CryptoSettings, CryptoVersion, Keyring, MutationResult,
    PlainSecret, SecretEncoding, StoreError, TokenIterator, TokenRecord,
};

pub const SLOT: u8 = 12;
pub const OTHER_SLOT: u8 = 13;
pub const SLOT_KEY: [u8; 32] = [0x42; 32];
pub const OTHER_SLOT_KEY: [u8; 32] = [0x24; 32];
pub const IV: [u8; 16] = [7; 16];

/// Base32 secrets with their raw bytes
#[allow(dead_code)]
pub const SECRETS: [(&str, &[u8]); 6] = [
    ("JBSWY3DPEHPK3PXP", b"Hello!\xde\xad\xbe\xef"),
    ("GEZDGNBVGY3TQOJQ", b"1234567890"),
    ("MFRGGZDFMZTWQ2LK", b"abcdefghij"),
    ("ONSWG4TFORVWK6JR", b"secretkey1"),
    ("LJMVQV2WKVKFGUSR", b"ZYXWVUTSRQ"),
    ("ORXXI4BNORXWWZLO", b"totp-token"),
];

pub fn keyring() -> Keyring {
    let mut keyring = Keyring::new();
    keyring.insert(SLOT, SLOT_KEY).unwrap();
    keyring.insert(OTHER_SLOT, OTHER_SLOT_KEY).unwrap();
    keyring
}

#[allow(dead_code)]
pub fn settings() -> CryptoSettings {
    CryptoSettings::new(SLOT, IV, CryptoVersion::CURRENT).unwrap()
}

#[allow(dead_code)]
pub struct Fixture {
    dir: TempDir,
    pub path: PathBuf,
    pub keyring: Keyring,
}

#[allow(dead_code)]
impl Fixture {
    /// Fresh, empty store written by `ConfigStore::create_new`
    pub fn new() -> Self {
        let fixture = Self::unwritten();
        ConfigStore::create_new(&fixture.path, &fixture.keyring, &settings()).unwrap();
        fixture
    }

    /// Temp dir and keyring, but no token file yet
    pub fn unwritten() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("totp.conf");
        Self {
            dir,
            path,
            keyring: keyring(),
        }
    }

    /// Store holding one TOTP token per name, secrets taken from `SECRETS`
    pub fn with_tokens(names: &[&str]) -> Self {
        let fixture = Self::new();
        let mut iter = fixture.iter();
        for (i, name) in names.iter().enumerate() {
            add(&mut iter, name, SECRETS[i % SECRETS.len()].0);
        }
        iter.free();
        fixture
    }

    /// Store written by an older release: crypto v1 secrets and verify marker
    pub fn legacy(tokens: &[(&str, &[u8])]) -> Self {
        let fixture = Self::unwritten();
        let mut text = format!(
            "Filetype: TOTP token store\nVersion: 2\nCryptoVersion: 1\nCryptoKeySlot: {SLOT}\nBaseIV: {}\nCryptoVerify: {}\n",
            hex::encode(IV),
            hex::encode(encrypt_v1(&SLOT_KEY, &IV, CRYPTO_VERIFY_MARKER).unwrap()),
        );
        for (name, secret) in tokens {
            text.push_str(&format!(
                "TokenName: {name}\nTokenSecret: {}\nTokenAlgo: sha1\nTokenDigits: 6\nTokenType: totp\nTokenDuration: 30\nTokenAutomationFeatures: none\n",
                hex::encode(encrypt_v1(&SLOT_KEY, &IV, secret).unwrap())
            ));
        }
        fs::write(&fixture.path, text).unwrap();
        fixture
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Open the store with the crypto settings recorded in its header
    pub fn iter(&self) -> TokenIterator<'_> {
        self.iter_with(&self.keyring)
    }

    pub fn iter_with<'p>(&self, provider: &'p dyn CryptoProvider) -> TokenIterator<'p> {
        let store = ConfigStore::open_existing(&self.path).unwrap();
        let settings = store.header().crypto_settings().unwrap();
        TokenIterator::new(store, provider, settings).unwrap()
    }

    pub fn bytes(&self) -> Vec<u8> {
        fs::read(&self.path).unwrap()
    }

    pub fn text(&self) -> String {
        fs::read_to_string(&self.path).unwrap()
    }

    /// Append raw lines to the token file
    pub fn append(&self, text: &str) {
        let mut file = fs::OpenOptions::new().append(true).open(&self.path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    /// Record `index` as committed on disk
    pub fn record_at(&self, index: usize) -> TokenRecord {
        ConfigStore::open_existing(&self.path)
            .unwrap()
            .read_record_at(index)
            .unwrap()
    }

    /// Crypto settings recorded in the committed header
    pub fn header_settings(&self) -> CryptoSettings {
        ConfigStore::open_existing(&self.path)
            .unwrap()
            .header()
            .crypto_settings()
            .unwrap()
    }

    /// Number of entries in the temp dir (leftover temp files show up here)
    pub fn dir_entries(&self) -> usize {
        fs::read_dir(self.dir.path()).unwrap().count()
    }
}

/// Add a default TOTP token and assert it was stored
#[allow(dead_code)]
pub fn add(iter: &mut TokenIterator<'_>, name: &str, secret_b32: &str) {
    let verdict = iter
        .add_new_token(|draft| {
            draft.set_name(name).unwrap();
            draft.set_secret(secret_b32, SecretEncoding::Base32).unwrap();
            MutationResult::Success
        })
        .unwrap();
    assert_eq!(verdict, MutationResult::Success);
}

/// Names in ordinal order, read one record at a time
#[allow(dead_code)]
pub fn names(iter: &mut TokenIterator<'_>) -> Vec<String> {
    (0..iter.total_count())
        .map(|i| {
            assert!(iter.go_to(i));
            iter.current().unwrap().name.clone()
        })
        .collect()
}

/// Keyring wrapper whose decrypt starts failing after a set number of calls
#[allow(dead_code)]
pub struct FlakyProvider {
    pub inner: Keyring,
    decrypts_left: Cell<Option<usize>>,
}

#[allow(dead_code)]
impl FlakyProvider {
    pub fn new() -> Self {
        Self {
            inner: keyring(),
            decrypts_left: Cell::new(None),
        }
    }

    pub fn fail_after(&self, decrypts: usize) {
        self.decrypts_left.set(Some(decrypts));
    }
}

impl CryptoProvider for FlakyProvider {
    fn encrypt(&self, plaintext: &[u8], settings: &CryptoSettings) -> totp_token_store::Result<Vec<u8>> {
        self.inner.encrypt(plaintext, settings)
    }

    fn decrypt(
        &self,
        ciphertext: &[u8],
        settings: &CryptoSettings,
    ) -> totp_token_store::Result<PlainSecret> {
        match self.decrypts_left.get() {
            Some(0) => Err(StoreError::Crypto("injected failure".into())),
            Some(n) => {
                self.decrypts_left.set(Some(n - 1));
                self.inner.decrypt(ciphertext, settings)
            }
            None => self.inner.decrypt(ciphertext, settings),
        }
    }
}
