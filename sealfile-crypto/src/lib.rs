//! Hybrid file envelope encryption.
//!
//! A file is sealed for one recipient:
//! - SHA-2 digest of the plaintext, signed with the sender's RSA key
//! - AES-CBC (PKCS#7) encryption of the content under a fresh session key
//! - Session key and IV wrapped with the recipient's RSA public key
//! - A JSON manifest beside the ciphertext carrying the wrapped key, the
//!   wrapped IV and the detached signature
//!
//! # Architecture
//!
//! Each concern sits behind a trait so the configured algorithms can be
//! resolved once at startup into a [`CryptoSuite`]:
//!
//! 1. [`ContentDigester`] streams a file through a hash in bounded chunks.
//! 2. [`StreamCipherCodec`] encrypts and decrypts file content.
//! 3. [`ContentSigner`] signs digests and verifies detached signatures.
//! 4. [`KeyWrapper`] wraps small secrets under an RSA public key.
//!
//! [`EnvelopeEncryptor`] and [`EnvelopeDecryptor`] drive the pipeline and
//! the [`manifest`] module persists its metadata.

pub mod cipher;
pub mod config;
pub mod digest;
pub mod envelope;
mod error;
pub mod keys;
pub mod manifest;
pub mod paths;
pub mod signer;
mod suite;
pub mod wrap;

#[cfg(test)]
mod testing;

pub use cipher::{AesCbcCodec, StreamCipherCodec};
pub use config::{
    CIPHER_BLOCK_SIZE, DEFAULT_BUFFER_SIZE, DigestAlgorithm, EnvelopeConfig, KeyWrapAlgorithm,
    SignatureAlgorithm, SymmetricAlgorithm,
};
pub use digest::{ContentDigester, Sha2Digester, to_hex};
pub use envelope::{
    EnvelopeDecryptor, EnvelopeEncryptor, EnvelopeStatus, SealedEnvelope, VerificationReport,
};
pub use error::{EnvelopeError, EnvelopeResult, ErrorKind, Stage};
pub use keys::{Identity, SessionKey};
pub use manifest::{Manifest, read_manifest, write_manifest};
pub use signer::{ContentSigner, RsaPkcs1v15Signer};
pub use suite::CryptoSuite;
pub use wrap::{KeyWrapper, RsaKeyWrapper};
