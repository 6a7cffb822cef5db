//! Envelope manifest: the wrapped key, wrapped IV and detached signature.
//!
//! Persisted as a flat JSON object beside the ciphertext:
//!
//! ```json
//! { "key": "<base64>", "iv": "<base64>", "sig": "<base64>" }
//! ```
//!
//! Field order is irrelevant on read and unknown fields are ignored. The
//! codec never interprets the bytes it carries.

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Session key wrapped under the recipient's public key.
    #[serde(rename = "key", with = "base64_field")]
    pub wrapped_key: Vec<u8>,
    /// IV wrapped under the recipient's public key.
    #[serde(rename = "iv", with = "base64_field")]
    pub wrapped_iv: Vec<u8>,
    /// Signature over the plaintext digest.
    #[serde(rename = "sig", with = "base64_field")]
    pub signature: Vec<u8>,
}

impl Manifest {
    pub fn to_json(&self) -> EnvelopeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> EnvelopeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Writes `manifest` to `path`, which must not exist yet.
///
/// The document is staged in a temporary file in the same directory and
/// moved into place without clobbering, so readers never observe a partial
/// manifest.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> EnvelopeResult<()> {
    paths::ensure_absent(path)?;
    let json = manifest.to_json()?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(json.as_bytes())?;
    staged.as_file().sync_all()?;

    staged.persist_noclobber(path).map_err(|e| match e.error.kind() {
        ErrorKind::AlreadyExists => {
            EnvelopeError::Path(format!("file already exists in path {}", path.display()))
        }
        _ => EnvelopeError::Io(e.error),
    })?;
    debug!("wrote manifest {}", path.display());
    Ok(())
}

pub fn read_manifest(path: &Path) -> EnvelopeResult<Manifest> {
    paths::ensure_readable(path)?;
    let json = std::fs::read_to_string(path)?;
    Manifest::from_json(&json)
        .map_err(|e| EnvelopeError::Format(format!("{}: {e}", path.display())))
}

mod base64_field {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| serde::de::Error::custom(format!("invalid base64: {e}")))
    }
}
