//! Detached signatures over content digests.
//!
//! A signature that does not match is a normal outcome and comes back as
//! `Ok(false)`; only engine failures are errors.

use crate::config::SignatureAlgorithm;
use crate::error::{EnvelopeError, EnvelopeResult};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha512};

/// ASN.1 DigestInfo prefix length for the SHA-2 family.
const DIGEST_INFO_PREFIX_LEN: usize = 19;
/// Minimum PKCS#1 v1.5 padding overhead.
const PKCS1_PADDING_OVERHEAD: usize = 11;

/// Signs digests with a private key and verifies them with a public key.
pub trait ContentSigner: Send + Sync {
    fn algorithm(&self) -> SignatureAlgorithm;

    fn sign(&self, data: &[u8], key: &RsaPrivateKey) -> EnvelopeResult<Vec<u8>>;

    fn verify(&self, data: &[u8], signature: &[u8], key: &RsaPublicKey) -> EnvelopeResult<bool>;

    /// Signs the UTF-8 bytes of `text`.
    fn sign_text(&self, text: &str, key: &RsaPrivateKey) -> EnvelopeResult<Vec<u8>> {
        self.sign(text.as_bytes(), key)
    }

    fn verify_text(
        &self,
        text: &str,
        signature: &[u8],
        key: &RsaPublicKey,
    ) -> EnvelopeResult<bool> {
        self.verify(text.as_bytes(), signature, key)
    }
}

/// RSASSA-PKCS1-v1_5 with a SHA-2 hash over the signed bytes.
#[derive(Clone, Debug)]
pub struct RsaPkcs1v15Signer {
    algorithm: SignatureAlgorithm,
}

impl RsaPkcs1v15Signer {
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        Self { algorithm }
    }

    fn check_modulus(&self, modulus_len: usize) -> EnvelopeResult<()> {
        let required =
            DIGEST_INFO_PREFIX_LEN + self.algorithm.hash().output_len() + PKCS1_PADDING_OVERHEAD;
        if modulus_len < required {
            return Err(EnvelopeError::Key(format!(
                "{}-bit key is too small for {:?} (needs at least {} bits)",
                modulus_len * 8,
                self.algorithm,
                required * 8
            )));
        }
        Ok(())
    }
}

impl ContentSigner for RsaPkcs1v15Signer {
    fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    fn sign(&self, data: &[u8], key: &RsaPrivateKey) -> EnvelopeResult<Vec<u8>> {
        self.check_modulus(key.size())?;
        let signed = match self.algorithm {
            SignatureAlgorithm::RsaPkcs1v15Sha256 => SigningKey::<Sha256>::new(key.clone())
                .try_sign(data)
                .map(|sig| sig.to_vec()),
            SignatureAlgorithm::RsaPkcs1v15Sha512 => SigningKey::<Sha512>::new(key.clone())
                .try_sign(data)
                .map(|sig| sig.to_vec()),
        };
        signed.map_err(|e| EnvelopeError::Signature(format!("signing failed: {e}")))
    }

    fn verify(&self, data: &[u8], signature: &[u8], key: &RsaPublicKey) -> EnvelopeResult<bool> {
        if signature.len() != key.size() {
            return Ok(false);
        }
        let Ok(signature) = Signature::try_from(signature) else {
            return Ok(false);
        };
        let verified = match self.algorithm {
            SignatureAlgorithm::RsaPkcs1v15Sha256 => VerifyingKey::<Sha256>::new(key.clone())
                .verify(data, &signature)
                .is_ok(),
            SignatureAlgorithm::RsaPkcs1v15Sha512 => VerifyingKey::<Sha512>::new(key.clone())
                .verify(data, &signature)
                .is_ok(),
        };
        Ok(verified)
    }
}
