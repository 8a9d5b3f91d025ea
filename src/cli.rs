//! Command-line definitions for the `web3_crypto` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// AES-GCM encryption and SHA-256 hashing.
#[derive(Parser)]
#[command(name = "web3_crypto", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Policy file (allowed key sizes, message limit). Must exist when given;
    /// otherwise `web3_crypto.toml` is used if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a file (or stdin) and print nonce, ciphertext and tag as JSON.
    Encrypt {
        /// Hex key of 16, 24 or 32 bytes.
        #[arg(long, env = "WEB3_CRYPTO_KEY", hide_env_values = true)]
        key: String,

        /// Hex nonce of 12 bytes. Generated when omitted.
        #[arg(long)]
        nonce: Option<String>,

        /// Hex associated data.
        #[arg(long)]
        aad: Option<String>,

        /// Plaintext file; stdin when omitted.
        input: Option<PathBuf>,
    },

    /// Verify and decrypt, writing the plaintext to stdout.
    Decrypt {
        /// Hex key of 16, 24 or 32 bytes.
        #[arg(long, env = "WEB3_CRYPTO_KEY", hide_env_values = true)]
        key: String,

        /// Hex nonce of 12 bytes.
        #[arg(long)]
        nonce: String,

        /// Hex tag of 16 bytes.
        #[arg(long)]
        tag: String,

        /// Hex associated data.
        #[arg(long)]
        aad: Option<String>,

        /// Hex ciphertext.
        #[arg(long)]
        ciphertext: String,
    },

    /// SHA-256 of a file (or stdin), read in chunks.
    Hash {
        /// Input file; stdin when omitted.
        input: Option<PathBuf>,
    },

    /// Print module and build information as JSON.
    Info,
}
