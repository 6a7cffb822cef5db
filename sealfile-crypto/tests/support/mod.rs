//! Shared fixtures for integration tests.
#![allow(dead_code)]

use rsa::RsaPrivateKey;
use sealfile_crypto::{
    CryptoSuite, EnvelopeDecryptor, EnvelopeEncryptor, EnvelopeResult, Identity, SealedEnvelope,
    VerificationReport,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

const TEST_KEY_BITS: usize = 1024;

fn generate() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::rngs::OsRng, TEST_KEY_BITS).unwrap()
}

pub fn alice() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

pub fn bob() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

pub fn mallory() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

/// Alice sending to Bob.
pub fn sender() -> Identity {
    Identity::new(alice().clone(), bob().to_public_key())
}

/// Bob receiving from Alice.
pub fn recipient() -> Identity {
    Identity::new(bob().clone(), alice().to_public_key())
}

/// Deterministic, non-repeating-looking test content.
pub fn content(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + 7) % 256) as u8).collect()
}

/// Scratch directory holding one plaintext file.
pub struct Scratch {
    pub dir: TempDir,
    pub plaintext: PathBuf,
}

impl Scratch {
    pub fn with_content(data: &[u8]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let plaintext = dir.path().join("plain.bin");
        std::fs::write(&plaintext, data).unwrap();
        Self { dir, plaintext }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn ciphertext(&self) -> PathBuf {
        self.path("plain.bin-encrypted")
    }

    pub fn seal(&self, suite: CryptoSuite) -> SealedEnvelope {
        let identity = sender();
        EnvelopeEncryptor::new(suite, &identity)
            .encrypt_and_sign(&self.plaintext, &self.ciphertext())
            .unwrap()
    }

    pub fn open(
        &self,
        suite: CryptoSuite,
        ciphertext: &Path,
        output: &Path,
    ) -> EnvelopeResult<VerificationReport> {
        let identity = recipient();
        EnvelopeDecryptor::new(suite, &identity).decrypt_and_verify(ciphertext, output)
    }
}
