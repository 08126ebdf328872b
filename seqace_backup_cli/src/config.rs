use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use seqace_backup_core::{BackupConfig, CLIENT_BINARY, DEFAULT_VAULT, FavoritesRepository};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration read from file and environment. Every field has a working
/// default, so the tool runs with no config file at all.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AppConfig {
    /// 1Password vault receiving backups.
    pub vault: String,

    /// Location of the Sequel Ace favorites plist.
    pub favorites_path: PathBuf,

    /// Client binary granted keychain access on restore.
    pub client_binary: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vault: DEFAULT_VAULT.to_string(),
            favorites_path: FavoritesRepository::default_path(),
            client_binary: CLIENT_BINARY.to_string(),
        }
    }
}

impl AppConfig {
    /// Fold in the CLI vault override; flags beat every other layer.
    pub fn into_backup_config(self, vault_flag: Option<String>) -> BackupConfig {
        BackupConfig {
            vault: vault_flag.unwrap_or(self.vault),
            favorites_path: self.favorites_path,
            client_binary: self.client_binary,
        }
    }
}

/// Loads layered configuration: CLI flags > environment > file > defaults.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    #[allow(dead_code)]
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("seqace-backup/config.toml")
    }

    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment = figment.merge(Env::prefixed("SEQACE_BACKUP_"));

        figment.extract().context("Failed to load configuration")
    }
}
