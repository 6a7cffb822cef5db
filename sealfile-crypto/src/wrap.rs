//! RSA key wrapping for session keys and IVs.

use crate::config::KeyWrapAlgorithm;
use crate::error::{EnvelopeError, EnvelopeResult};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

/// Asymmetric encryption of small secrets.
pub trait KeyWrapper: Send + Sync {
    fn algorithm(&self) -> KeyWrapAlgorithm;

    /// Largest payload `key` can wrap under this padding scheme.
    fn max_payload(&self, key: &RsaPublicKey) -> usize;

    fn wrap(&self, payload: &[u8], recipient: &RsaPublicKey) -> EnvelopeResult<Vec<u8>>;

    fn unwrap(&self, wrapped: &[u8], own: &RsaPrivateKey) -> EnvelopeResult<Vec<u8>>;
}

#[derive(Clone, Debug)]
pub struct RsaKeyWrapper {
    algorithm: KeyWrapAlgorithm,
}

impl RsaKeyWrapper {
    pub fn new(algorithm: KeyWrapAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl KeyWrapper for RsaKeyWrapper {
    fn algorithm(&self) -> KeyWrapAlgorithm {
        self.algorithm
    }

    fn max_payload(&self, key: &RsaPublicKey) -> usize {
        let overhead = match self.algorithm {
            KeyWrapAlgorithm::RsaPkcs1v15 => 11,
            // 2 * SHA-256 output + 2
            KeyWrapAlgorithm::RsaOaepSha256 => 66,
        };
        key.size().saturating_sub(overhead)
    }

    fn wrap(&self, payload: &[u8], recipient: &RsaPublicKey) -> EnvelopeResult<Vec<u8>> {
        let capacity = self.max_payload(recipient);
        if payload.len() > capacity {
            return Err(EnvelopeError::Key(format!(
                "payload of {} bytes exceeds the {capacity}-byte capacity of a {}-bit key",
                payload.len(),
                recipient.size() * 8
            )));
        }

        let mut rng = rand::rngs::OsRng;
        let wrapped = match self.algorithm {
            KeyWrapAlgorithm::RsaPkcs1v15 => recipient.encrypt(&mut rng, Pkcs1v15Encrypt, payload),
            KeyWrapAlgorithm::RsaOaepSha256 => {
                recipient.encrypt(&mut rng, Oaep::new::<Sha256>(), payload)
            }
        };
        wrapped.map_err(|e| EnvelopeError::Key(format!("wrap failed: {e}")))
    }

    fn unwrap(&self, wrapped: &[u8], own: &RsaPrivateKey) -> EnvelopeResult<Vec<u8>> {
        let unwrapped = match self.algorithm {
            KeyWrapAlgorithm::RsaPkcs1v15 => own.decrypt(Pkcs1v15Encrypt, wrapped),
            KeyWrapAlgorithm::RsaOaepSha256 => own.decrypt(Oaep::new::<Sha256>(), wrapped),
        };
        unwrapped.map_err(|_| {
            EnvelopeError::Key("unwrap failed (wrong private key or corrupted data)".to_string())
        })
    }
}
