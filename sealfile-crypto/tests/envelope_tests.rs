mod support;

use pretty_assertions::assert_eq;
use sealfile_crypto::{
    CIPHER_BLOCK_SIZE, CryptoSuite, DEFAULT_BUFFER_SIZE, DigestAlgorithm, EnvelopeConfig,
    EnvelopeDecryptor, EnvelopeEncryptor, EnvelopeStatus, KeyWrapAlgorithm, SignatureAlgorithm,
    SymmetricAlgorithm, paths, read_manifest, to_hex,
};
use support::{Scratch, content, recipient, sender};

fn roundtrip(data: &[u8], suite: CryptoSuite) {
    let scratch = Scratch::with_content(data);
    let sealed = scratch.seal(suite.clone());
    let output = scratch.path("decrypted.bin");

    let report = scratch.open(suite, &sealed.ciphertext, &output).unwrap();

    assert_eq!(report.status, EnvelopeStatus::Verified);
    assert_eq!(report.digest, sealed.digest);
    assert_eq!(std::fs::read(&output).unwrap(), data);
}

#[test]
fn roundtrip_small_file() {
    roundtrip(b"Jonathan is awesome", CryptoSuite::default());
}

#[test]
fn roundtrip_more_than_ten_buffers() {
    roundtrip(&content(10 * DEFAULT_BUFFER_SIZE + 513), CryptoSuite::default());
}

#[test]
fn roundtrip_exactly_one_buffer() {
    roundtrip(&content(DEFAULT_BUFFER_SIZE), CryptoSuite::default());
}

#[test]
fn roundtrip_one_buffer_plus_one() {
    roundtrip(&content(DEFAULT_BUFFER_SIZE + 1), CryptoSuite::default());
}

#[test]
fn empty_file_is_one_padding_block() {
    let scratch = Scratch::with_content(b"");
    let sealed = scratch.seal(CryptoSuite::default());

    let ciphertext = std::fs::read(&sealed.ciphertext).unwrap();
    assert_eq!(ciphertext.len(), CIPHER_BLOCK_SIZE);

    let output = scratch.path("decrypted.bin");
    let report = scratch
        .open(CryptoSuite::default(), &sealed.ciphertext, &output)
        .unwrap();
    assert!(report.is_authentic());
    assert_eq!(std::fs::metadata(&output).unwrap().len(), 0);
}

#[test]
fn ciphertext_has_no_header() {
    let data = content(100);
    let scratch = Scratch::with_content(&data);
    let sealed = scratch.seal(CryptoSuite::default());

    // 100 bytes pad to 112; nothing is prefixed
    assert_eq!(std::fs::metadata(&sealed.ciphertext).unwrap().len(), 112);
}

#[test]
fn manifest_sits_beside_ciphertext() {
    let scratch = Scratch::with_content(b"hello");
    let sealed = scratch.seal(CryptoSuite::default());

    assert_eq!(sealed.manifest, scratch.path("plain.bin-encrypted-config.json"));
    assert_eq!(sealed.manifest, paths::manifest_path_for(&sealed.ciphertext));

    let json = std::fs::read_to_string(&sealed.manifest).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let fields: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(fields.len(), 3);
    for field in ["key", "iv", "sig"] {
        assert!(value[field].is_string(), "missing {field}");
    }
}

#[test]
fn manifest_carries_wrapped_material_only() {
    let scratch = Scratch::with_content(b"hello");
    let sealed = scratch.seal(CryptoSuite::default());
    let manifest = read_manifest(&sealed.manifest).unwrap();

    // RSA output is always modulus-sized
    assert_eq!(manifest.wrapped_key.len(), 128);
    assert_eq!(manifest.wrapped_iv.len(), 128);
    assert_eq!(manifest.signature.len(), 128);
}

#[test]
fn non_default_suite_roundtrip() {
    let config = EnvelopeConfig {
        symmetric: SymmetricAlgorithm::Aes256Cbc,
        digest: DigestAlgorithm::Sha512,
        signature: SignatureAlgorithm::RsaPkcs1v15Sha512,
        key_wrap: KeyWrapAlgorithm::RsaOaepSha256,
        buffer_size: 100,
    };
    let suite = CryptoSuite::from_config(&config).unwrap();
    roundtrip(&content(3000), suite);
}

#[test]
fn report_carries_digest_and_signature() {
    let scratch = Scratch::with_content(b"report me");
    let sealed = scratch.seal(CryptoSuite::default());
    let manifest = read_manifest(&sealed.manifest).unwrap();

    let report = scratch
        .open(CryptoSuite::default(), &sealed.ciphertext, &scratch.path("out"))
        .unwrap();
    assert_eq!(report.signature, manifest.signature);
    assert_eq!(report.digest_hex(), to_hex(&sealed.digest));
    assert_eq!(report.output, scratch.path("out"));
}

#[test]
fn explicit_manifest_path() {
    let scratch = Scratch::with_content(b"custom manifest location");
    let ciphertext = scratch.path("blob");
    let manifest = scratch.path("meta.json");

    let sender = sender();
    EnvelopeEncryptor::new(CryptoSuite::default(), &sender)
        .encrypt_and_sign_to(&scratch.plaintext, &ciphertext, &manifest)
        .unwrap();
    assert!(!paths::manifest_path_for(&ciphertext).exists());

    let recipient = recipient();
    let report = EnvelopeDecryptor::new(CryptoSuite::default(), &recipient)
        .decrypt_and_verify_with(&ciphertext, &manifest, &scratch.path("out"))
        .unwrap();
    assert!(report.is_authentic());
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn envelope_always_roundtrips(data in proptest::collection::vec(any::<u8>(), 0..5000)) {
            let scratch = Scratch::with_content(&data);
            let sealed = scratch.seal(CryptoSuite::default());
            let output = scratch.path("out");
            let report = scratch.open(CryptoSuite::default(), &sealed.ciphertext, &output).unwrap();

            prop_assert!(report.is_authentic());
            prop_assert_eq!(std::fs::read(&output).unwrap(), data);
        }
    }
}
