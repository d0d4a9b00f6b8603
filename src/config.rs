use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::crypto::{PassphraseVault, DEFAULT_KDF_ITERATIONS};
use crate::error::{LedgerError, Result};
use crate::rotation::RotationPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "ledger.toml";
pub const ENV_PREFIX: &str = "LEDGER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub vault: Option<VaultConfig>,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub ledger: LedgerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Encrypted key file plus the secrets needed to open it. The passphrase
/// and salt are only ever supplied here, never compiled in.
#[derive(Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    pub key_path: PathBuf,
    pub passphrase: String,
    pub salt: String,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl VaultConfig {
    pub fn open(&self) -> Result<PassphraseVault> {
        PassphraseVault::new(self.passphrase.as_bytes(), self.salt.as_bytes(), self.iterations)
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("key_path", &self.key_path)
            .field("passphrase", &"<redacted>")
            .field("salt", &"<redacted>")
            .field("iterations", &self.iterations)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    #[serde(default)]
    pub policy: RotationPolicy,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            policy: RotationPolicy::default(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Transaction cap; `0` means unlimited.
    #[serde(default = "default_max_transactions")]
    pub max_transactions: usize,
}

impl LedgerSettings {
    pub fn capacity_limit(&self) -> Option<usize> {
        match self.max_transactions {
            0 => None,
            limit => Some(limit),
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            max_transactions: default_max_transactions(),
        }
    }
}

fn default_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

fn default_channel_capacity() -> usize {
    8
}

fn default_max_transactions() -> usize {
    100_000
}

impl AppConfig {
    /// Load from `LEDGER_CONFIG` (or `ledger.toml`, if present) overlaid with
    /// `LEDGER__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self> {
        let path = env::var("LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Some(&path))
    }

    pub fn load_from(path: Option<&str>) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path).required(false));
        }

        let config: Self = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rotation.channel_capacity == 0 {
            return Err(LedgerError::ConfigError(
                "rotation.channel_capacity must be positive".to_string(),
            ));
        }
        if let Some(vault) = &self.vault {
            if vault.passphrase.is_empty() {
                return Err(LedgerError::ConfigError(
                    "vault.passphrase must not be empty".to_string(),
                ));
            }
            if vault.iterations == 0 {
                return Err(LedgerError::ConfigError(
                    "vault.iterations must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
