//! Build script for the module information table.
//!
//! Writes `build_info.rs` into `OUT_DIR` with the crate name and version, the target
//! platform and architecture, and the build date and time in the `__DATE__` /
//! `__TIME__` layouts. `SOURCE_DATE_EPOCH` pins the timestamp for reproducible builds.

use std::env;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let Ok(out_dir) = env::var("OUT_DIR") else {
        panic!("OUT_DIR not set");
    };
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    let built_at = build_timestamp();
    let date = built_at.format("%b %e %Y").to_string();
    let time = built_at.format("%H:%M:%S").to_string();

    let table = format!(
        "pub(crate) const MODULE_NAME: &str = {name:?};\n\
         pub(crate) const MODULE_VERSION: &str = {version:?};\n\
         pub(crate) const TARGET_OS: &str = {target_os:?};\n\
         pub(crate) const TARGET_ARCH: &str = {target_arch:?};\n\
         pub(crate) const BUILD_DATE: &str = {date:?};\n\
         pub(crate) const BUILD_TIME: &str = {time:?};\n",
        name = "web3_crypto_native",
    );

    let path = PathBuf::from(out_dir).join("build_info.rs");
    if let Err(e) = fs::write(&path, table) {
        panic!("failed to write {}: {e}", path.display());
    }
}

/// `SOURCE_DATE_EPOCH` when set and valid, the current time otherwise.
fn build_timestamp() -> DateTime<Utc> {
    let Ok(raw) = env::var("SOURCE_DATE_EPOCH") else {
        return Utc::now();
    };
    let pinned = raw
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    match pinned {
        Some(ts) => ts,
        None => {
            println!("cargo:warning=ignoring invalid SOURCE_DATE_EPOCH {raw:?}");
            Utc::now()
        }
    }
}
