// tests/crypto_tests.rs
mod common;
mod support;

use support::{keyring, settings, IV, OTHER_SLOT, SLOT, SLOT_KEY};
use totp_token_store::crypto::{decrypt_v2, encrypt_v1, rekey};
use totp_token_store::token::decode_secret;
use totp_token_store::{CryptoProvider, CryptoSettings, CryptoVersion, Keyring, SecretEncoding, StoreError};

#[test]
fn test_encrypt_decrypt_roundtrip() {
    common::setup();
    let keyring = keyring();
    let settings = settings();

    let plaintexts: [&[u8]; 3] = [b"x", b"Hello!\xde\xad\xbe\xef", &[0u8; 64]];
    for plaintext in plaintexts {
        let ciphertext = keyring.encrypt(plaintext, &settings).unwrap();
        assert_ne!(ciphertext.as_slice(), plaintext);
        let decrypted = keyring.decrypt(&ciphertext, &settings).unwrap();
        assert_eq!(decrypted.expose_secret().as_slice(), plaintext);
    }
}

#[test]
fn test_encrypt_is_deterministic() {
    let keyring = keyring();
    let settings = settings();

    let a = keyring.encrypt(b"1234567890", &settings).unwrap();
    let b = keyring.encrypt(b"1234567890", &settings).unwrap();
    assert_eq!(a, b);

    // distinct secrets never share a nonce
    let c = keyring.encrypt(b"abcdefghij", &settings).unwrap();
    assert_ne!(a[..12], c[..12]);

    // a different IV changes the output
    let other_iv = CryptoSettings::new(SLOT, [9; 16], CryptoVersion::V2).unwrap();
    assert_ne!(a, keyring.encrypt(b"1234567890", &other_iv).unwrap());
}

#[test]
fn test_encrypt_always_writes_current_version() {
    let keyring = keyring();
    let legacy = CryptoSettings::new(SLOT, IV, CryptoVersion::V1).unwrap();

    let ciphertext = keyring.encrypt(b"secretkey1", &legacy).unwrap();
    let plaintext = decrypt_v2(&SLOT_KEY, SLOT, &ciphertext).unwrap();
    assert_eq!(plaintext.expose_secret().as_slice(), b"secretkey1");
}

#[test]
fn test_legacy_v1_ciphertext_still_decrypts() {
    let keyring = keyring();
    let legacy = CryptoSettings::new(SLOT, IV, CryptoVersion::V1).unwrap();

    let ciphertext = encrypt_v1(&SLOT_KEY, &IV, b"totp-token").unwrap();
    let plaintext = keyring.decrypt(&ciphertext, &legacy).unwrap();
    assert_eq!(plaintext.expose_secret().as_slice(), b"totp-token");
}

#[test]
fn test_wrong_slot_fails_authentication() {
    let keyring = keyring();
    let ciphertext = keyring.encrypt(b"secretkey1", &settings()).unwrap();

    let other = CryptoSettings::new(OTHER_SLOT, IV, CryptoVersion::V2).unwrap();
    let err = keyring.decrypt(&ciphertext, &other).unwrap_err();
    assert!(matches!(err, StoreError::Crypto(_)));
}

#[test]
fn test_tampered_or_short_ciphertext_is_crypto_error() {
    let keyring = keyring();
    let settings = settings();
    let mut ciphertext = keyring.encrypt(b"secretkey1", &settings).unwrap();

    let last = ciphertext.len() - 1;
    ciphertext[last] ^= 0x01;
    assert!(matches!(
        keyring.decrypt(&ciphertext, &settings),
        Err(StoreError::Crypto(_))
    ));

    assert!(matches!(
        keyring.decrypt(&ciphertext[..10], &settings),
        Err(StoreError::Crypto(_))
    ));
}

#[test]
fn test_missing_slot_key_is_crypto_error() {
    let keyring = Keyring::derive(b"only slot fifty", [50]).unwrap();
    assert!(keyring.has_slot(50));
    assert!(!keyring.has_slot(SLOT));

    let err = keyring.encrypt(b"abc", &settings()).unwrap_err();
    assert!(matches!(err, StoreError::Crypto(_)));
}

#[test]
fn test_key_slot_bounds() {
    assert!(CryptoSettings::new(11, IV, CryptoVersion::V2).unwrap_err().is_validation());
    assert!(CryptoSettings::new(101, IV, CryptoVersion::V2).unwrap_err().is_validation());
    assert!(CryptoSettings::new(12, IV, CryptoVersion::V2).is_ok());
    assert!(CryptoSettings::new(100, IV, CryptoVersion::V2).is_ok());

    let mut keyring = Keyring::new();
    assert!(keyring.insert(3, [0; 32]).unwrap_err().is_validation());
}

#[test]
fn test_derived_slots_are_independent() {
    let keyring = Keyring::derive(b"master secret", [SLOT, OTHER_SLOT]).unwrap();
    let a = keyring.encrypt(b"abcdefghij", &settings()).unwrap();
    let other = CryptoSettings::new(OTHER_SLOT, IV, CryptoVersion::V2).unwrap();
    let b = keyring.encrypt(b"abcdefghij", &other).unwrap();
    assert_ne!(a, b);

    // same master, same keys
    let again = Keyring::derive(b"master secret", [SLOT]).unwrap();
    assert_eq!(again.encrypt(b"abcdefghij", &settings()).unwrap(), a);
}

#[test]
fn test_derive_from_hex_rejects_short_or_bad_keys() {
    assert!(Keyring::derive_from_hex("00112233", [SLOT]).unwrap_err().is_validation());
    assert!(Keyring::derive_from_hex("not hex at all", [SLOT]).unwrap_err().is_validation());
    assert!(Keyring::derive_from_hex(&"ab".repeat(32), [SLOT]).is_ok());
}

#[test]
fn test_rekey_moves_secret_to_new_slot() {
    let keyring = keyring();
    let from = CryptoSettings::new(SLOT, IV, CryptoVersion::V1).unwrap();
    let to = CryptoSettings::new(OTHER_SLOT, [1; 16], CryptoVersion::V2).unwrap();

    let legacy = encrypt_v1(&SLOT_KEY, &IV, b"ZYXWVUTSRQ").unwrap();
    let rekeyed = rekey(&keyring, &legacy, &from, &to).unwrap();

    let plaintext = keyring.decrypt(&rekeyed, &to).unwrap();
    assert_eq!(plaintext.expose_secret().as_slice(), b"ZYXWVUTSRQ");
    assert!(keyring.decrypt(&rekeyed, &settings()).is_err());
}

#[test]
fn test_decode_secret_base32_is_forgiving() {
    let expected = b"Hello!\xde\xad\xbe\xef";
    for input in ["JBSWY3DPEHPK3PXP", "jbsw y3dp ehpk 3pxp", "JBSW-Y3DP-EHPK-3PXP"] {
        let secret = decode_secret(input, SecretEncoding::Base32).unwrap();
        assert_eq!(secret.expose_secret().as_slice(), expected, "input {input:?}");
    }

    let padded = decode_secret("MFRGG===", SecretEncoding::Base32).unwrap();
    assert_eq!(padded.expose_secret().as_slice(), b"abc");
}

#[test]
fn test_decode_secret_base32_ignores_trailing_bits() {
    // "MFRGG" is canonical; the last symbol of "MFRGH" sets an unused bit
    for input in ["MFRGH", "mfrgh", "MFRGH==="] {
        let secret = decode_secret(input, SecretEncoding::Base32).unwrap();
        assert_eq!(secret.expose_secret().as_slice(), b"abc", "input {input:?}");
    }

    // two symbols carry 10 bits for one byte
    let secret = decode_secret("ME", SecretEncoding::Base32).unwrap();
    assert_eq!(secret.expose_secret().as_slice(), b"a");
    let secret = decode_secret("MH", SecretEncoding::Base32).unwrap();
    assert_eq!(secret.expose_secret().as_slice(), b"a");
}

#[test]
fn test_decode_secret_base64() {
    let secret = decode_secret("c2VjcmV0a2V5MQ==", SecretEncoding::Base64).unwrap();
    assert_eq!(secret.expose_secret().as_slice(), b"secretkey1");
}

#[test]
fn test_decode_failures_are_validation_errors() {
    for (input, encoding) in [
        ("JBSWY3DPEHPK3PX1", SecretEncoding::Base32),
        ("", SecretEncoding::Base32),
        ("   ", SecretEncoding::Base64),
        ("not*base64", SecretEncoding::Base64),
    ] {
        let err = decode_secret(input, encoding).unwrap_err();
        assert!(err.is_validation(), "{input:?} gave {err}");
    }
}
