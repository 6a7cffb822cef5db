//! `sealfile`: sign-then-encrypt files for a single recipient.
//!
//! ```text
//! sealfile encrypt --key alice.pem --peer bob.pub.pem --file report.pdf
//! sealfile decrypt --key bob.pem --peer alice.pub.pem --file report.pdf-encrypted
//! sealfile keygen --out keys/ --name alice
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sealfile", version)]
#[command(about = "Hybrid RSA + AES-CBC file encryption with detached signatures")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign and encrypt a file for a recipient
    Encrypt {
        /// Sender's private key (PEM)
        #[arg(long)]
        key: PathBuf,
        /// Recipient's public key (PEM)
        #[arg(long)]
        peer: PathBuf,
        /// Plaintext to seal
        #[arg(long)]
        file: PathBuf,
        /// Ciphertext path [default: <file>-encrypted]
        #[arg(long)]
        out: Option<PathBuf>,
        /// JSON algorithm configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decrypt a file and verify the sender's signature
    Decrypt {
        /// Recipient's private key (PEM)
        #[arg(long)]
        key: PathBuf,
        /// Sender's public key (PEM)
        #[arg(long)]
        peer: PathBuf,
        /// Ciphertext to open
        #[arg(long)]
        file: PathBuf,
        /// Manifest path [default: <file>-config.json]
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Output path [default: decrypted.txt beside the ciphertext]
        #[arg(long)]
        out: Option<PathBuf>,
        /// JSON algorithm configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Generate an RSA keypair as PEM files
    Keygen {
        /// Directory to write the keys into
        #[arg(long)]
        out: PathBuf,
        /// File stem for `<name>.pem` and `<name>.pub.pem`
        #[arg(long, default_value = "sealfile")]
        name: String,
        #[arg(long, default_value_t = 2048)]
        bits: usize,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    commands::run(cli.command)
}
