//! Envelope error types.

use std::fmt;
use thiserror::Error;

/// Result type for envelope operations.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

/// Errors that can occur while sealing or opening an envelope.
///
/// A signature that simply fails to verify is not an error; it is reported
/// through [`crate::VerificationReport`].
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Missing or unreadable source, or a destination that already exists.
    #[error("path error: {0}")]
    Path(String),

    /// Wrong key type, size or algorithm, including oversized wrap payloads.
    #[error("key error: {0}")]
    Key(String),

    #[error("invalid IV length: expected {expected} bytes, got {actual}")]
    Iv { expected: usize, actual: usize },

    /// Corrupt ciphertext or the wrong key. The two are indistinguishable.
    #[error("padding error (corrupt ciphertext or wrong key): {0}")]
    Padding(String),

    /// Manifest malformed or missing a required field.
    #[error("manifest format error: {0}")]
    Format(String),

    /// Engine-level signing or verification failure.
    #[error("signature error: {0}")]
    Signature(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// An envelope pipeline halted at `stage`. [`EnvelopeError::kind`]
    /// reports the underlying cause.
    #[error("{stage} failed: {error}")]
    Stage { stage: Stage, error: Box<EnvelopeError> },
}

/// Pipeline step of an envelope operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Preconditions,
    Digest,
    Sign,
    Encrypt,
    WrapKey,
    WrapIv,
    WriteManifest,
    ReadManifest,
    UnwrapKey,
    UnwrapIv,
    Decrypt,
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Preconditions => "preconditions",
            Self::Digest => "digest",
            Self::Sign => "sign",
            Self::Encrypt => "encrypt",
            Self::WrapKey => "wrap key",
            Self::WrapIv => "wrap iv",
            Self::WriteManifest => "write manifest",
            Self::ReadManifest => "read manifest",
            Self::UnwrapKey => "unwrap key",
            Self::UnwrapIv => "unwrap iv",
            Self::Decrypt => "decrypt",
            Self::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// Fieldless discriminant of [`EnvelopeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Path,
    Key,
    Iv,
    Padding,
    Format,
    Signature,
    Io,
    Config,
}

impl EnvelopeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Path(_) => ErrorKind::Path,
            Self::Key(_) => ErrorKind::Key,
            Self::Iv { .. } => ErrorKind::Iv,
            Self::Padding(_) => ErrorKind::Padding,
            Self::Format(_) => ErrorKind::Format,
            Self::Signature(_) => ErrorKind::Signature,
            Self::Io(_) => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
            Self::Stage { error, .. } => error.kind(),
        }
    }

    /// The envelope stage that failed, if the error came out of a pipeline.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e.to_string())
    }
}
