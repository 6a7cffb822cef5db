//! Envelope configuration.
//!
//! Assembled once at startup and handed to [`crate::CryptoSuite::from_config`],
//! which resolves each algorithm choice into a concrete strategy.

use crate::error::{EnvelopeError, EnvelopeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default streaming chunk size in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Block size shared by every supported symmetric cipher (AES).
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Symmetric cipher applied to file content. Always CBC with PKCS#7 padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymmetricAlgorithm {
    #[default]
    Aes128Cbc,
    Aes256Cbc,
}

impl SymmetricAlgorithm {
    /// Session key length in bytes.
    #[must_use]
    pub fn key_len(self) -> usize {
        match self {
            Self::Aes128Cbc => 16,
            Self::Aes256Cbc => 32,
        }
    }

    #[must_use]
    pub fn iv_len(self) -> usize {
        CIPHER_BLOCK_SIZE
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    #[must_use]
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    #[default]
    RsaPkcs1v15Sha256,
    RsaPkcs1v15Sha512,
}

impl SignatureAlgorithm {
    /// Hash applied to the signed bytes.
    #[must_use]
    pub fn hash(self) -> DigestAlgorithm {
        match self {
            Self::RsaPkcs1v15Sha256 => DigestAlgorithm::Sha256,
            Self::RsaPkcs1v15Sha512 => DigestAlgorithm::Sha512,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyWrapAlgorithm {
    #[default]
    RsaPkcs1v15,
    RsaOaepSha256,
}

/// Algorithm selection and tuning for envelope operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub symmetric: SymmetricAlgorithm,
    pub digest: DigestAlgorithm,
    pub signature: SignatureAlgorithm,
    pub key_wrap: KeyWrapAlgorithm,
    /// Chunk size for streaming digest and cipher passes.
    pub buffer_size: usize,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            symmetric: SymmetricAlgorithm::default(),
            digest: DigestAlgorithm::default(),
            signature: SignatureAlgorithm::default(),
            key_wrap: KeyWrapAlgorithm::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl EnvelopeConfig {
    /// Loads a config from a JSON file. Absent fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> EnvelopeResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            EnvelopeError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| EnvelopeError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EnvelopeResult<()> {
        if self.buffer_size < CIPHER_BLOCK_SIZE {
            return Err(EnvelopeError::Config(format!(
                "buffer_size must be at least {CIPHER_BLOCK_SIZE} bytes, got {}",
                self.buffer_size
            )));
        }
        Ok(())
    }
}
