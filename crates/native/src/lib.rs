//! `web3_crypto_native`: the module surface over the `crypto` core.
//!
//! [`CryptoModule`] exposes `encrypt`, `decrypt`, `hash` and `module_info`. It
//! validates its inputs, applies the [`ModuleConfig`] policy and dispatches to a
//! [`CryptoBackend`].

pub mod backend;
pub mod config;
pub mod facade;
pub mod module_info;

pub use backend::{CryptoBackend, SoftwareBackend};
pub use config::{ConfigError, ModuleConfig, load_config, read_config};
pub use facade::{CryptoModule, Sealed};
pub use module_info::{Arch, ModuleInfo, Platform, SymbolVisibility, module_info};

// Callers only need this crate.
pub use crypto::{CryptoError, Digest, HashState, SecretBytes};
