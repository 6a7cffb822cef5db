use crate::Command;
use anyhow::{Context, Result, bail};
use sealfile_crypto::keys::{generate_keypair, private_key_to_pem, public_key_to_pem};
use sealfile_crypto::paths::{default_decrypted_path, default_encrypted_path, manifest_path_for};
use sealfile_crypto::{
    CryptoSuite, EnvelopeConfig, EnvelopeDecryptor, EnvelopeEncryptor, Identity,
    VerificationReport,
};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

/// Exit status when decryption succeeded but the signature did not verify.
const TAMPERED_EXIT: u8 = 2;

pub(crate) fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Encrypt { key, peer, file, out, config } => {
            let suite = load_suite(config.as_deref())?;
            let identity = Identity::load(&key, &peer).context("failed to load keys")?;
            let dest = out.unwrap_or_else(|| default_encrypted_path(&file));
            encrypt(suite, &identity, &file, &dest)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Decrypt { key, peer, file, manifest, out, config } => {
            let suite = load_suite(config.as_deref())?;
            let identity = Identity::load(&key, &peer).context("failed to load keys")?;
            let manifest = manifest.unwrap_or_else(|| manifest_path_for(&file));
            let output = out.unwrap_or_else(|| default_decrypted_path(&file));
            let report = decrypt(suite, &identity, &file, &manifest, &output)?;
            if report.is_authentic() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(TAMPERED_EXIT))
            }
        }
        Command::Keygen { out, name, bits } => {
            keygen(&out, &name, bits)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_suite(config: Option<&Path>) -> Result<CryptoSuite> {
    let config = match config {
        Some(path) => EnvelopeConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EnvelopeConfig::default(),
    };
    Ok(CryptoSuite::from_config(&config)?)
}

fn encrypt(suite: CryptoSuite, identity: &Identity, file: &Path, dest: &Path) -> Result<()> {
    let sealed = EnvelopeEncryptor::new(suite, identity)
        .encrypt_and_sign(file, dest)
        .with_context(|| format!("failed to seal {}", file.display()))?;
    println!("{}", sealed.ciphertext.display());
    println!("{}", sealed.manifest.display());
    Ok(())
}

/// Opens an envelope. A tampered result replaces the output with a notice
/// so the unverified plaintext is not left behind.
fn decrypt(
    suite: CryptoSuite,
    identity: &Identity,
    file: &Path,
    manifest: &Path,
    output: &Path,
) -> Result<VerificationReport> {
    let report = EnvelopeDecryptor::new(suite, identity)
        .decrypt_and_verify_with(file, manifest, output)
        .with_context(|| format!("failed to open {}", file.display()))?;

    if report.is_authentic() {
        info!(output = %output.display(), "content verified");
        println!("{}", output.display());
    } else {
        let notice = tamper_notice(&report);
        error!("{notice}");
        std::fs::write(output, notice.as_bytes())
            .with_context(|| format!("failed to overwrite {}", output.display()))?;
    }
    Ok(report)
}

fn tamper_notice(report: &VerificationReport) -> String {
    format!(
        "signature verification failed: content was tampered with or not signed by the expected sender (digest {})\n",
        report.digest_hex()
    )
}

fn keygen(dir: &Path, name: &str, bits: usize) -> Result<()> {
    if name.is_empty() || name.contains(std::path::is_separator) {
        bail!("invalid key name {name:?}");
    }
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let private_path = dir.join(format!("{name}.pem"));
    let public_path = dir.join(format!("{name}.pub.pem"));
    for path in [&private_path, &public_path] {
        if path.exists() {
            bail!("refusing to overwrite {}", path.display());
        }
    }

    let (private, public) = generate_keypair(bits)?;
    write_new(&private_path, private_key_to_pem(&private)?.as_bytes())?;
    write_new(&public_path, public_key_to_pem(&public)?.as_bytes())?;

    info!(
        bits,
        private = %private_path.display(),
        public = %public_path.display(),
        "generated keypair"
    );
    println!("{}", private_path.display());
    println!("{}", public_path.display());
    Ok(())
}

fn write_new(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = sealfile_crypto::paths::create_new(path)?;
    file.write_all(contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
