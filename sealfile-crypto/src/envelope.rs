//! Envelope orchestration.
//!
//! Sealing: digest the plaintext, sign the digest, generate a session key,
//! encrypt the file, wrap key and IV for the recipient, then persist the
//! manifest. Nothing is written to the manifest path unless every earlier
//! step succeeded.
//!
//! Opening: read the manifest, unwrap key and IV, decrypt, digest the
//! recovered plaintext and verify the sender's signature over it.
//!
//! Decryption runs before the signature can be checked because the signed
//! digest covers plaintext. The ciphertext itself is never authenticated
//! before it is processed; callers must treat the output as untrusted until
//! the report says [`EnvelopeStatus::Verified`].

use crate::digest::to_hex;
use crate::error::{EnvelopeError, EnvelopeResult, Stage};
use crate::keys::{Identity, SessionKey};
use crate::manifest::{Manifest, read_manifest, write_manifest};
use crate::paths;
use crate::suite::CryptoSuite;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Logs the failing stage and tags the error with it.
fn at<T>(stage: Stage, result: EnvelopeResult<T>) -> EnvelopeResult<T> {
    result.map_err(|e| {
        warn!(%stage, error = %e, "envelope pipeline halted");
        EnvelopeError::Stage {
            stage,
            error: Box::new(e),
        }
    })
}

/// Prefixes key errors with the manifest field they concern.
fn for_field(field: &str, err: EnvelopeError) -> EnvelopeError {
    match err {
        EnvelopeError::Key(msg) => EnvelopeError::Key(format!("field `{field}`: {msg}")),
        other => other,
    }
}

fn check_seal_paths(source: &Path, dest: &Path, manifest_path: &Path) -> EnvelopeResult<()> {
    paths::ensure_readable(source)?;
    paths::ensure_absent(dest)?;
    paths::ensure_absent(manifest_path)
}

/// Result of a successful seal.
#[derive(Clone, Debug)]
pub struct SealedEnvelope {
    pub ciphertext: PathBuf,
    pub manifest: PathBuf,
    /// Digest of the plaintext that was signed.
    pub digest: Vec<u8>,
}

/// Encrypts and signs files for a single recipient.
pub struct EnvelopeEncryptor<'a> {
    suite: CryptoSuite,
    identity: &'a Identity,
}

impl<'a> EnvelopeEncryptor<'a> {
    /// `identity` pairs the sender's private key with the recipient's public key.
    pub fn new(suite: CryptoSuite, identity: &'a Identity) -> Self {
        Self { suite, identity }
    }

    /// Seals `source` into `dest`, writing the manifest to
    /// `<dest>-config.json`.
    pub fn encrypt_and_sign(&self, source: &Path, dest: &Path) -> EnvelopeResult<SealedEnvelope> {
        self.encrypt_and_sign_to(source, dest, &paths::manifest_path_for(dest))
    }

    pub fn encrypt_and_sign_to(
        &self,
        source: &Path,
        dest: &Path,
        manifest_path: &Path,
    ) -> EnvelopeResult<SealedEnvelope> {
        let suite = &self.suite;

        at(Stage::Preconditions, check_seal_paths(source, dest, manifest_path))?;

        let digest = at(Stage::Digest, suite.digester.digest_file(source))?;
        debug!(digest = %to_hex(&digest), "digested {}", source.display());

        let signature = at(Stage::Sign, suite.signer.sign(&digest, self.identity.own_key()))?;

        let session_key = SessionKey::generate(suite.cipher.algorithm().key_len());
        let iv = Zeroizing::new(at(
            Stage::Encrypt,
            suite.cipher.encrypt_file(source, dest, session_key.as_bytes()),
        )?);
        debug!("encrypted {} -> {}", source.display(), dest.display());

        let recipient = self.identity.counterparty_key();
        let wrapped_key = at(
            Stage::WrapKey,
            suite
                .wrapper
                .wrap(session_key.as_bytes(), recipient)
                .map_err(|e| for_field("key", e)),
        )?;
        drop(session_key);
        let wrapped_iv = at(
            Stage::WrapIv,
            suite.wrapper.wrap(&iv, recipient).map_err(|e| for_field("iv", e)),
        )?;

        let manifest = Manifest {
            wrapped_key,
            wrapped_iv,
            signature,
        };
        at(Stage::WriteManifest, write_manifest(&manifest, manifest_path))?;

        info!(
            ciphertext = %dest.display(),
            manifest = %manifest_path.display(),
            digest = %to_hex(&digest),
            "envelope sealed"
        );
        Ok(SealedEnvelope {
            ciphertext: dest.to_path_buf(),
            manifest: manifest_path.to_path_buf(),
            digest,
        })
    }
}

/// Outcome of signature verification on decrypted content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeStatus {
    Verified,
    Tampered,
}

impl fmt::Display for EnvelopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => f.write_str("verified"),
            Self::Tampered => f.write_str("tampered"),
        }
    }
}

/// What the decryptor found. The caller decides what to do with a
/// tampered output file.
#[derive(Clone, Debug)]
pub struct VerificationReport {
    pub status: EnvelopeStatus,
    /// Decrypted output file.
    pub output: PathBuf,
    /// Digest recomputed over the decrypted output.
    pub digest: Vec<u8>,
    /// Signature taken from the manifest.
    pub signature: Vec<u8>,
}

impl VerificationReport {
    #[must_use]
    pub fn is_authentic(&self) -> bool {
        self.status == EnvelopeStatus::Verified
    }

    #[must_use]
    pub fn digest_hex(&self) -> String {
        to_hex(&self.digest)
    }
}

/// Decrypts envelopes addressed to the local identity and checks the
/// sender's signature.
pub struct EnvelopeDecryptor<'a> {
    suite: CryptoSuite,
    identity: &'a Identity,
}

impl<'a> EnvelopeDecryptor<'a> {
    /// `identity` pairs the recipient's private key with the sender's public key.
    pub fn new(suite: CryptoSuite, identity: &'a Identity) -> Self {
        Self { suite, identity }
    }

    /// Opens `ciphertext` using the manifest at `<ciphertext>-config.json`.
    pub fn decrypt_and_verify(
        &self,
        ciphertext: &Path,
        output: &Path,
    ) -> EnvelopeResult<VerificationReport> {
        self.decrypt_and_verify_with(ciphertext, &paths::manifest_path_for(ciphertext), output)
    }

    pub fn decrypt_and_verify_with(
        &self,
        ciphertext: &Path,
        manifest_path: &Path,
        output: &Path,
    ) -> EnvelopeResult<VerificationReport> {
        let suite = &self.suite;

        at(
            Stage::Preconditions,
            paths::ensure_readable(ciphertext).and_then(|()| paths::ensure_absent(output)),
        )?;

        let manifest = at(Stage::ReadManifest, read_manifest(manifest_path))?;

        let own = self.identity.own_key();
        let session_key = SessionKey::from_bytes(at(
            Stage::UnwrapKey,
            suite
                .wrapper
                .unwrap(&manifest.wrapped_key, own)
                .map_err(|e| for_field("key", e)),
        )?);
        let iv = Zeroizing::new(at(
            Stage::UnwrapIv,
            suite
                .wrapper
                .unwrap(&manifest.wrapped_iv, own)
                .map_err(|e| for_field("iv", e)),
        )?);

        at(
            Stage::Decrypt,
            suite
                .cipher
                .decrypt_file(ciphertext, output, session_key.as_bytes(), &iv),
        )?;
        drop(session_key);
        debug!("decrypted {} -> {}", ciphertext.display(), output.display());

        let digest = at(Stage::Digest, suite.digester.digest_file(output))?;
        let verified = at(
            Stage::Verify,
            suite
                .signer
                .verify(&digest, &manifest.signature, self.identity.counterparty_key()),
        )?;

        let status = if verified {
            info!(output = %output.display(), digest = %to_hex(&digest), "signature verified");
            EnvelopeStatus::Verified
        } else {
            warn!(
                output = %output.display(),
                digest = %to_hex(&digest),
                signature = %to_hex(&manifest.signature),
                "signature mismatch: content was tampered with or signed by another key"
            );
            EnvelopeStatus::Tampered
        };

        Ok(VerificationReport {
            status,
            output: output.to_path_buf(),
            digest,
            signature: manifest.signature,
        })
    }
}
