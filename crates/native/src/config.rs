//! Policy configuration for [`CryptoModule`](crate::CryptoModule).
//!
//! Read from a TOML file. [`load_config`] falls back to the defaults only when the
//! file does not exist; any other problem is reported, so a restrictive policy is
//! never silently widened.

use std::path::{Path, PathBuf};

use crypto::{KeySize, MAX_PLAINTEXT_LEN};
use serde::Deserialize;

/// Errors from parsing or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unsupported key size: {0} bytes")]
    UnsupportedKeySize(usize),

    #[error("allowed_key_sizes must not be empty")]
    NoKeySizes,

    #[error("max_message_len {0} exceeds the GCM limit of 2^36 - 32 bytes")]
    MessageLimitTooLarge(u64),
}

/// Which inputs the facade accepts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    /// Key lengths in bytes; a subset of 16, 24 and 32.
    pub allowed_key_sizes: Vec<usize>,
    /// Upper bound on plaintext and ciphertext length.
    pub max_message_len: u64,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            allowed_key_sizes: vec![16, 24, 32],
            max_message_len: MAX_PLAINTEXT_LEN,
        }
    }
}

impl ModuleConfig {
    /// Parse and validate a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_key_sizes.is_empty() {
            return Err(ConfigError::NoKeySizes);
        }
        for &len in &self.allowed_key_sizes {
            if KeySize::from_len(len).is_err() {
                return Err(ConfigError::UnsupportedKeySize(len));
            }
        }
        if self.max_message_len > MAX_PLAINTEXT_LEN {
            return Err(ConfigError::MessageLimitTooLarge(self.max_message_len));
        }
        Ok(())
    }

    pub fn allows_key_size(&self, size: KeySize) -> bool {
        self.allowed_key_sizes.contains(&size.len())
    }
}

/// Read and validate the configuration at `path`. A missing file is an error.
pub fn read_config(path: &Path) -> Result<ModuleConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ModuleConfig::from_toml_str(&content)
}

/// Load configuration from `path`, using the defaults only when the file is absent.
///
/// A file that exists but cannot be read, parsed or validated is an error; it is
/// never replaced by the (more permissive) defaults.
pub fn load_config(path: &Path) -> Result<ModuleConfig, ConfigError> {
    match read_config(path) {
        Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            Ok(ModuleConfig::default())
        }
        Err(err) => {
            tracing::warn!("Rejecting config {}: {err}", path.display());
            Err(err)
        }
        ok => ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("crypto.toml")).unwrap();
        assert_eq!(config, ModuleConfig::default());
    }

    #[test]
    fn read_config_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            read_config(&tmp.path().join("crypto.toml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("crypto.toml");
        std::fs::write(
            &path,
            r#"
allowed_key_sizes = [32]
max_message_len = 1048576
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.allowed_key_sizes, vec![32]);
        assert_eq!(config.max_message_len, 1_048_576);
        assert!(config.allows_key_size(KeySize::Aes256));
        assert!(!config.allows_key_size(KeySize::Aes128));
    }

    #[test]
    fn load_config_invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("crypto.toml");
        std::fs::write(&path, "this is not { valid toml !!!").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_config_invalid_restrictive_policy_is_not_widened() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("crypto.toml");
        // AES-256 only, with a typo in the list.
        std::fs::write(&path, "allowed_key_sizes = [32, 33]").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedKeySize(33))));
    }

    #[test]
    fn restrictive_policy_rejects_smaller_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("crypto.toml");
        std::fs::write(&path, "allowed_key_sizes = [32]").unwrap();

        let module = crate::CryptoModule::with_config(load_config(&path).unwrap());
        assert_eq!(
            module
                .encrypt(&[7u8; 16], Some(&[0u8; 12]), b"m", None)
                .unwrap_err(),
            crypto::CryptoError::InvalidKeyLength
        );
        assert!(module.encrypt(&[7u8; 32], Some(&[0u8; 12]), b"m", None).is_ok());
    }

    #[test]
    fn from_toml_str_partial_uses_defaults() {
        let config = ModuleConfig::from_toml_str("max_message_len = 64").unwrap();
        assert_eq!(config.allowed_key_sizes, vec![16, 24, 32]);
        assert_eq!(config.max_message_len, 64);
    }

    #[test]
    fn from_toml_str_rejects_bad_policy() {
        assert!(matches!(
            ModuleConfig::from_toml_str("allowed_key_sizes = [16, 20]"),
            Err(ConfigError::UnsupportedKeySize(20))
        ));
        assert!(matches!(
            ModuleConfig::from_toml_str("allowed_key_sizes = []"),
            Err(ConfigError::NoKeySizes)
        ));
        assert!(matches!(
            ModuleConfig::from_toml_str("max_message_len = 68719476705"),
            Err(ConfigError::MessageLimitTooLarge(_))
        ));
        assert!(matches!(
            ModuleConfig::from_toml_str("unknown_field = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
