//! Resolution of configured algorithms into concrete engines.

use crate::cipher::{AesCbcCodec, StreamCipherCodec};
use crate::config::EnvelopeConfig;
use crate::digest::{ContentDigester, Sha2Digester};
use crate::error::EnvelopeResult;
use crate::signer::{ContentSigner, RsaPkcs1v15Signer};
use crate::wrap::{KeyWrapper, RsaKeyWrapper};
use std::sync::Arc;

/// The set of engines one envelope operation runs with.
///
/// Engines hold no per-call state, so a suite can be shared between the
/// encryptor and decryptor built from the same configuration.
#[derive(Clone)]
pub struct CryptoSuite {
    pub digester: Arc<dyn ContentDigester>,
    pub cipher: Arc<dyn StreamCipherCodec>,
    pub signer: Arc<dyn ContentSigner>,
    pub wrapper: Arc<dyn KeyWrapper>,
}

impl CryptoSuite {
    pub fn from_config(config: &EnvelopeConfig) -> EnvelopeResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &EnvelopeConfig) -> Self {
        Self {
            digester: Arc::new(Sha2Digester::new(config.digest, config.buffer_size)),
            cipher: Arc::new(AesCbcCodec::new(config.symmetric, config.buffer_size)),
            signer: Arc::new(RsaPkcs1v15Signer::new(config.signature)),
            wrapper: Arc::new(RsaKeyWrapper::new(config.key_wrap)),
        }
    }
}

impl Default for CryptoSuite {
    fn default() -> Self {
        Self::build(&EnvelopeConfig::default())
    }
}

impl std::fmt::Debug for CryptoSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoSuite")
            .field("digest", &self.digester.algorithm())
            .field("cipher", &self.cipher.algorithm())
            .field("signature", &self.signer.algorithm())
            .field("key_wrap", &self.wrapper.algorithm())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DigestAlgorithm, KeyWrapAlgorithm, SymmetricAlgorithm};

    #[test]
    fn suite_reflects_config() {
        let config = EnvelopeConfig {
            symmetric: SymmetricAlgorithm::Aes256Cbc,
            digest: DigestAlgorithm::Sha512,
            key_wrap: KeyWrapAlgorithm::RsaOaepSha256,
            ..Default::default()
        };
        let suite = CryptoSuite::from_config(&config).unwrap();
        assert_eq!(suite.cipher.algorithm(), SymmetricAlgorithm::Aes256Cbc);
        assert_eq!(suite.digester.algorithm(), DigestAlgorithm::Sha512);
        assert_eq!(suite.wrapper.algorithm(), KeyWrapAlgorithm::RsaOaepSha256);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = EnvelopeConfig { buffer_size: 4, ..Default::default() };
        assert!(CryptoSuite::from_config(&config).is_err());
    }
}
