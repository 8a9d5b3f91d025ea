//! `web3_crypto` command-line entry point.
//!
//! Parses arguments, loads the policy file and dispatches to [`CryptoModule`].

mod cli;
mod input;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use web3_crypto_native::{CryptoModule, ModuleConfig, SecretBytes, load_config, read_config};

use cli::{Cli, Commands};
use input::{CHUNK_LEN, decode_secret, read_secret};

/// Policy file consulted when `--config` is not given. It may be absent.
const DEFAULT_CONFIG: &str = "web3_crypto.toml";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,web3_crypto=debug,web3_crypto_native=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config: ModuleConfig = match cli.config.as_deref() {
        Some(path) => read_config(path)?,
        None => load_config(Path::new(DEFAULT_CONFIG))?,
    };
    let module = CryptoModule::with_config(config);
    tracing::debug!(
        allowed_key_sizes = ?module.config().allowed_key_sizes,
        max_message_len = module.config().max_message_len,
        "policy loaded"
    );

    match cli.command {
        Commands::Encrypt {
            key,
            nonce,
            aad,
            input,
        } => {
            let key = decode_secret(key, "key")?;
            let nonce = nonce.map(|n| hex::decode(n).context("nonce is not hex")).transpose()?;
            let aad = aad.map(|a| hex::decode(a).context("aad is not hex")).transpose()?;
            let plaintext = read_plaintext(input.as_deref())?;

            let sealed = module.encrypt(
                key.as_slice(),
                nonce.as_deref(),
                plaintext.as_slice(),
                aad.as_deref(),
            )?;

            let output = serde_json::json!({
                "nonce": hex::encode(sealed.nonce.as_bytes()),
                "ciphertext": hex::encode(&sealed.ciphertext),
                "tag": hex::encode(sealed.tag.as_bytes()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Decrypt {
            key,
            nonce,
            tag,
            aad,
            ciphertext,
        } => {
            let key = decode_secret(key, "key")?;
            let nonce = hex::decode(nonce).context("nonce is not hex")?;
            let tag = hex::decode(tag).context("tag is not hex")?;
            let aad = aad.map(|a| hex::decode(a).context("aad is not hex")).transpose()?;
            let ciphertext = hex::decode(ciphertext).context("ciphertext is not hex")?;

            let plaintext =
                module.decrypt(key.as_slice(), &nonce, &ciphertext, &tag, aad.as_deref())?;

            let mut stdout = io::stdout().lock();
            stdout.write_all(plaintext.as_slice())?;
            stdout.flush()?;
        }

        Commands::Hash { input } => {
            let mut reader: Box<dyn Read> = match input.as_deref() {
                Some(path) => Box::new(
                    File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
                ),
                None => Box::new(io::stdin().lock()),
            };

            let mut state = module.hash_stream();
            let mut buf = vec![0u8; CHUNK_LEN];
            loop {
                let n = reader.read(&mut buf).context("failed to read input")?;
                if n == 0 {
                    break;
                }
                state.update(&buf[..n])?;
            }
            println!("{}", state.finalize()?);
        }

        Commands::Info => {
            println!("{}", serde_json::to_string_pretty(module.module_info())?);
        }
    }

    Ok(())
}

/// Plaintext from a file (reserved at its length) or from stdin.
fn read_plaintext(path: Option<&Path>) -> anyhow::Result<SecretBytes> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            let len = file.metadata().map(|m| m.len()).unwrap_or(0);
            read_secret(file, usize::try_from(len).unwrap_or(0))
        }
        None => read_secret(io::stdin().lock(), 0),
    }
}
