//! Streaming AES-CBC file encryption with PKCS#7 padding.
//!
//! Content is transformed chunk by chunk; only whole blocks are written
//! until end of input, where the padded final block is emitted. The IV is
//! generated fresh on every encryption and returned to the caller; it is
//! never prefixed to the ciphertext.

use crate::config::{CIPHER_BLOCK_SIZE, SymmetricAlgorithm};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::paths;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::{Aes128, Aes256};
use rand::RngCore;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Symmetric encryption of file content.
pub trait StreamCipherCodec: Send + Sync {
    fn algorithm(&self) -> SymmetricAlgorithm;

    fn validate_key(&self, key: &[u8]) -> EnvelopeResult<()> {
        let expected = self.algorithm().key_len();
        if key.len() != expected {
            return Err(EnvelopeError::Key(format!(
                "{:?} requires a {expected}-byte key, got {}",
                self.algorithm(),
                key.len()
            )));
        }
        Ok(())
    }

    fn validate_iv(&self, iv: &[u8]) -> EnvelopeResult<()> {
        let expected = self.algorithm().iv_len();
        if iv.len() != expected {
            return Err(EnvelopeError::Iv { expected, actual: iv.len() });
        }
        Ok(())
    }

    /// Encrypts `reader` into `writer` under a fresh IV, which is returned.
    fn encrypt_stream(
        &self,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        key: &[u8],
    ) -> EnvelopeResult<Vec<u8>>;

    fn decrypt_stream(
        &self,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        key: &[u8],
        iv: &[u8],
    ) -> EnvelopeResult<()>;

    /// Encrypts `source` into the not-yet-existing `dest` and returns the IV.
    fn encrypt_file(&self, source: &Path, dest: &Path, key: &[u8]) -> EnvelopeResult<Vec<u8>> {
        let mut input = paths::open_source(source)?;
        self.validate_key(key)?;
        let mut output = BufWriter::new(paths::create_new(dest)?);
        let result = self.encrypt_stream(&mut input, &mut output, key);
        finish(output, result)
    }

    /// Decrypts `source` into the not-yet-existing `dest`.
    fn decrypt_file(
        &self,
        source: &Path,
        dest: &Path,
        key: &[u8],
        iv: &[u8],
    ) -> EnvelopeResult<()> {
        let mut input = paths::open_source(source)?;
        self.validate_key(key)?;
        self.validate_iv(iv)?;
        let mut output = BufWriter::new(paths::create_new(dest)?);
        let result = self.decrypt_stream(&mut input, &mut output, key, iv);
        finish(output, result)
    }
}

/// Flushes partial output on every exit path, then reports the first failure.
fn finish<T>(mut output: BufWriter<File>, result: EnvelopeResult<T>) -> EnvelopeResult<T> {
    let flushed = output.flush();
    let value = result?;
    flushed?;
    Ok(value)
}

/// AES in CBC mode with PKCS#7 padding.
#[derive(Clone, Debug)]
pub struct AesCbcCodec {
    algorithm: SymmetricAlgorithm,
    buffer_size: usize,
}

impl AesCbcCodec {
    pub fn new(algorithm: SymmetricAlgorithm, buffer_size: usize) -> Self {
        Self {
            algorithm,
            buffer_size: buffer_size.max(CIPHER_BLOCK_SIZE),
        }
    }

    fn encrypt_with_iv(
        &self,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        key: &[u8],
        iv: &[u8],
    ) -> EnvelopeResult<()> {
        self.validate_key(key)?;
        self.validate_iv(iv)?;
        match self.algorithm {
            SymmetricAlgorithm::Aes128Cbc => {
                let cipher = Aes128CbcEnc::new_from_slices(key, iv).map_err(invalid_length)?;
                encrypt_blocks(cipher, reader, writer, self.buffer_size)
            }
            SymmetricAlgorithm::Aes256Cbc => {
                let cipher = Aes256CbcEnc::new_from_slices(key, iv).map_err(invalid_length)?;
                encrypt_blocks(cipher, reader, writer, self.buffer_size)
            }
        }
    }
}

impl StreamCipherCodec for AesCbcCodec {
    fn algorithm(&self) -> SymmetricAlgorithm {
        self.algorithm
    }

    fn encrypt_stream(
        &self,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        key: &[u8],
    ) -> EnvelopeResult<Vec<u8>> {
        let mut iv = vec![0u8; self.algorithm.iv_len()];
        rand::rngs::OsRng.fill_bytes(&mut iv);
        self.encrypt_with_iv(reader, writer, key, &iv)?;
        Ok(iv)
    }

    fn decrypt_stream(
        &self,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        key: &[u8],
        iv: &[u8],
    ) -> EnvelopeResult<()> {
        self.validate_key(key)?;
        self.validate_iv(iv)?;
        match self.algorithm {
            SymmetricAlgorithm::Aes128Cbc => {
                let cipher = Aes128CbcDec::new_from_slices(key, iv).map_err(invalid_length)?;
                decrypt_blocks(cipher, reader, writer, self.buffer_size)
            }
            SymmetricAlgorithm::Aes256Cbc => {
                let cipher = Aes256CbcDec::new_from_slices(key, iv).map_err(invalid_length)?;
                decrypt_blocks(cipher, reader, writer, self.buffer_size)
            }
        }
    }
}

fn invalid_length(e: aes::cipher::InvalidLength) -> EnvelopeError {
    EnvelopeError::Key(format!("cipher initialization failed: {e}"))
}

fn encrypt_blocks<C>(
    mut cipher: C,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    buffer_size: usize,
) -> EnvelopeResult<()>
where
    C: BlockEncryptMut,
{
    let bs = C::block_size();
    let mut buffer = vec![0u8; buffer_size];
    let mut pending: Vec<u8> = Vec::with_capacity(buffer_size + bs);

    loop {
        let n = read_chunk(reader, &mut buffer)?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buffer[..n]);

        let ready = pending.len() - pending.len() % bs;
        for block in pending[..ready].chunks_exact_mut(bs) {
            cipher.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        writer.write_all(&pending[..ready])?;
        pending.drain(..ready);
    }

    // pending now holds fewer than one block; PKCS#7 fills it out, or
    // emits a whole padding block when it is empty.
    let mut last = vec![0u8; bs];
    let tail = pending.len();
    last[..tail].copy_from_slice(&pending);
    let block = cipher
        .encrypt_padded_mut::<Pkcs7>(&mut last, tail)
        .map_err(|_| EnvelopeError::Padding("failed to pad final block".to_string()))?;
    writer.write_all(block)?;
    writer.flush()?;
    Ok(())
}

fn decrypt_blocks<C>(
    mut cipher: C,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    buffer_size: usize,
) -> EnvelopeResult<()>
where
    C: BlockDecryptMut,
{
    let bs = C::block_size();
    let mut buffer = vec![0u8; buffer_size];
    let mut pending: Vec<u8> = Vec::with_capacity(buffer_size + bs);

    loop {
        let n = read_chunk(reader, &mut buffer)?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buffer[..n]);

        // The last whole block carries the padding, so it is held back
        // until end of input.
        if pending.len() > bs {
            let mut ready = pending.len() - pending.len() % bs;
            if ready == pending.len() {
                ready -= bs;
            }
            for block in pending[..ready].chunks_exact_mut(bs) {
                cipher.decrypt_block_mut(GenericArray::from_mut_slice(block));
            }
            writer.write_all(&pending[..ready])?;
            pending.drain(..ready);
        }
    }

    if pending.len() != bs {
        return Err(EnvelopeError::Padding(format!(
            "ciphertext length is not a positive multiple of the {bs}-byte block size"
        )));
    }
    let plaintext = cipher
        .decrypt_padded_mut::<Pkcs7>(&mut pending)
        .map_err(|_| EnvelopeError::Padding("invalid padding in final block".to_string()))?;
    writer.write_all(plaintext)?;
    writer.flush()?;
    Ok(())
}

fn read_chunk(reader: &mut dyn Read, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buffer) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
