use pretty_assertions::assert_eq;
use sealfile_crypto::{
    DigestAlgorithm, EnvelopeConfig, ErrorKind, KeyWrapAlgorithm, SignatureAlgorithm,
    SymmetricAlgorithm,
};

#[test]
fn defaults_match_reference_tool() {
    let config = EnvelopeConfig::default();
    assert_eq!(config.symmetric, SymmetricAlgorithm::Aes128Cbc);
    assert_eq!(config.digest, DigestAlgorithm::Sha256);
    assert_eq!(config.signature, SignatureAlgorithm::RsaPkcs1v15Sha256);
    assert_eq!(config.key_wrap, KeyWrapAlgorithm::RsaPkcs1v15);
    assert_eq!(config.buffer_size, 1024);
}

#[test]
fn serialization_roundtrip() {
    let config = EnvelopeConfig {
        symmetric: SymmetricAlgorithm::Aes256Cbc,
        digest: DigestAlgorithm::Sha512,
        signature: SignatureAlgorithm::RsaPkcs1v15Sha512,
        key_wrap: KeyWrapAlgorithm::RsaOaepSha256,
        buffer_size: 4096,
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: EnvelopeConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn partial_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sealfile.json");
    std::fs::write(&path, r#"{ "symmetric": "aes256-cbc" }"#).unwrap();

    let config = EnvelopeConfig::from_file(&path).unwrap();
    assert_eq!(config.symmetric, SymmetricAlgorithm::Aes256Cbc);
    assert_eq!(config.digest, DigestAlgorithm::Sha256);
    assert_eq!(config.buffer_size, 1024);
}

#[test]
fn unknown_algorithm_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sealfile.json");
    std::fs::write(&path, r#"{ "digest": "md5" }"#).unwrap();

    let err = EnvelopeConfig::from_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn buffer_smaller_than_block_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sealfile.json");
    std::fs::write(&path, r#"{ "buffer_size": 8 }"#).unwrap();

    let err = EnvelopeConfig::from_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("buffer_size"));
}

#[test]
fn missing_config_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EnvelopeConfig::from_file(dir.path().join("nope.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
