//! Reading keys and plaintext without leaving unwiped copies behind.

use std::io::{self, Read};

use anyhow::Context;
use web3_crypto_native::SecretBytes;
use zeroize::Zeroizing;

/// Read size for files and stdin.
pub const CHUNK_LEN: usize = 64 * 1024;

/// Decode a hex secret straight into a buffer that is wiped on drop.
///
/// The hex text itself is taken by value and wiped before returning.
pub fn decode_secret(value: String, what: &str) -> anyhow::Result<SecretBytes> {
    let value = Zeroizing::new(value);
    let mut out = SecretBytes::try_zeroed(value.len() / 2)?;
    // The decode error names the offending character; do not echo it.
    hex::decode_to_slice(value.as_bytes(), out.as_mut_slice())
        .map_err(|_| anyhow::anyhow!("{what} is not valid hex"))?;
    Ok(out)
}

/// Read `reader` to the end into a wiped-on-drop buffer.
///
/// `size_hint` (a file's length, or 0) is reserved up front. When the data
/// outgrows it, a larger buffer is reserved explicitly and the old one is wiped
/// as it is dropped, so no reallocation frees plaintext uncleared.
pub fn read_secret<R: Read>(mut reader: R, size_hint: usize) -> anyhow::Result<SecretBytes> {
    let mut data = Zeroizing::new(Vec::new());
    data.try_reserve_exact(size_hint)
        .context("failed to reserve input buffer")?;
    let mut chunk = Zeroizing::new(vec![0u8; CHUNK_LEN]);

    loop {
        let n = match reader.read(chunk.as_mut_slice()) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err).context("failed to read input"),
        };

        let needed = data.len() + n;
        if needed > data.capacity() {
            let mut grown = Zeroizing::new(Vec::new());
            grown
                .try_reserve_exact(needed.max(data.capacity() * 2))
                .context("failed to grow input buffer")?;
            grown.extend_from_slice(&data);
            data = grown;
        }
        data.extend_from_slice(&chunk[..n]);
    }

    Ok(SecretBytes::from(std::mem::take(&mut *data)))
}
