//! The backup/restore/clear flows tying the favorites file, the keychain,
//! and the vault together.
//!
//! Each operation runs its external calls strictly one at a time. Per-secret
//! failures inside the extraction, restore, and deletion loops are counted
//! and logged but never abort the loop; only a failed top-level step (read
//! favorites, persist snapshot, overwrite file) fails the whole operation.

use crate::app::{AppController, CLIENT_BINARY, OsascriptController};
use crate::error::{BackupError, Result};
use crate::keychain::{CredentialStore, SecurityCommand};
use crate::keys;
use crate::model::{FavoritesDocument, PasswordEntry, SecretKind, Snapshot};
use crate::repository::FavoritesRepository;
use crate::vault::{BACKUP_TITLE_PREFIX, DEFAULT_VAULT, OnePasswordCli, VaultClient, VaultEntry};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Timestamp layout embedded in backup titles. Lexicographic order of titles
/// built from it matches chronological order, which "most recent" resolution
/// relies on.
const TITLE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Explicit configuration threaded through the orchestrator; there is no
/// process-wide state.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Vault receiving backup documents.
    pub vault: String,
    /// Location of the favorites plist.
    pub favorites_path: PathBuf,
    /// Client binary granted keychain access on restore.
    pub client_binary: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            vault: DEFAULT_VAULT.to_string(),
            favorites_path: FavoritesRepository::default_path(),
            client_binary: CLIENT_BINARY.to_string(),
        }
    }
}

/// Confirmation gates for the destructive clear flow, injected so the flow is
/// testable without a live terminal.
pub trait ClearPrompt: Send + Sync {
    /// Offer a safety backup before anything is deleted. `Ok(true)` requests
    /// one.
    fn offer_backup(&self, favorites: usize) -> Result<bool>;

    /// Require the exact destructive confirmation token. `Ok(false)` cancels
    /// with no mutation of any store.
    fn confirm_delete(&self, favorites: usize) -> Result<bool>;
}

/// Terminal report of a successful backup.
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub title: String,
    pub item_id: String,
    pub vault: String,
    pub favorites: usize,
    pub secrets_found: usize,
}

/// Terminal report of a restore. `secrets_restored` counts successful
/// keychain writes out of `secrets_total` snapshot entries.
#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub title: String,
    pub favorites: usize,
    pub secrets_restored: usize,
    pub secrets_total: usize,
    pub local_backup: Option<PathBuf>,
}

/// Outcome of the clear flow. Cancellation is a value, not an error.
#[derive(Debug, Clone)]
pub enum ClearOutcome {
    /// No favorites file, or zero favorites; nothing was touched and no
    /// confirmation was requested.
    NothingToClear,
    /// The operator declined a confirmation gate; nothing was touched.
    Cancelled,
    Cleared {
        favorites: usize,
        secrets_deleted: usize,
        safety_backup: Option<BackupReport>,
    },
}

/// Composes the repository and the three external ports into the user-facing
/// operations.
pub struct BackupOrchestrator {
    config: BackupConfig,
    repository: FavoritesRepository,
    credentials: Arc<dyn CredentialStore>,
    vault: Arc<dyn VaultClient>,
    app: Arc<dyn AppController>,
}

impl BackupOrchestrator {
    pub fn new(
        config: BackupConfig,
        credentials: Arc<dyn CredentialStore>,
        vault: Arc<dyn VaultClient>,
        app: Arc<dyn AppController>,
    ) -> Self {
        let repository = FavoritesRepository::new(&config.favorites_path);
        Self {
            config,
            repository,
            credentials,
            vault,
            app,
        }
    }

    /// Build an orchestrator on the real command-line adapters, verifying the
    /// vault transport before any operation begins.
    pub async fn connect(config: BackupConfig) -> Result<Self> {
        let vault = Arc::new(OnePasswordCli::new(&config.vault));
        vault.ensure_ready().await?;
        Ok(Self::new(
            config,
            Arc::new(SecurityCommand),
            vault,
            Arc::new(OsascriptController),
        ))
    }

    pub fn vault_name(&self) -> &str {
        &self.config.vault
    }

    pub fn favorites_path(&self) -> &std::path::Path {
        self.repository.path()
    }

    /// Back up the favorites and their best-effort extracted secrets to the
    /// vault. A caller-supplied title is used verbatim; otherwise a
    /// timestamp-derived one is generated.
    pub async fn backup(&self, title: Option<&str>) -> Result<BackupReport> {
        let now = Local::now();
        let title = match title {
            Some(title) => title.to_string(),
            None => format!("{BACKUP_TITLE_PREFIX} - {}", now.format(TITLE_TIMESTAMP)),
        };
        self.backup_at(title, now).await
    }

    async fn backup_at(&self, title: String, now: DateTime<Local>) -> Result<BackupReport> {
        log::info!("Reading favorites from {}", self.repository.path().display());
        let favorites = self.repository.read()?;
        let profile_count = favorites.root.children.len();
        log::info!("Found {profile_count} favorites");

        let mut passwords = BTreeMap::new();
        for favorite in &favorites.root.children {
            let primary = keys::primary_ref(favorite);
            match self.credentials.lookup(&primary.service, &primary.account).await {
                Ok(Some(secret)) => {
                    log::debug!("Extracted password for '{}'", favorite.name);
                    passwords.insert(
                        keys::entry_id(favorite),
                        PasswordEntry {
                            service: primary.service,
                            account: primary.account,
                            password: secret,
                            kind: SecretKind::Primary,
                        },
                    );
                }
                Ok(None) => log::info!("No password found for '{}'", favorite.name),
                Err(err) => {
                    log::warn!("Keychain lookup failed for '{}': {err}", favorite.name)
                }
            }

            let Some(tunnel) = keys::tunnel_ref(favorite) else {
                continue;
            };
            match self.credentials.lookup(&tunnel.service, &tunnel.account).await {
                Ok(Some(secret)) => {
                    log::debug!("Extracted SSH password for '{}'", favorite.name);
                    passwords.insert(
                        keys::tunnel_entry_id(favorite),
                        PasswordEntry {
                            service: tunnel.service,
                            account: tunnel.account,
                            password: secret,
                            kind: SecretKind::Tunnel,
                        },
                    );
                }
                Ok(None) => {
                    log::info!("No SSH password found for '{}'", favorite.name)
                }
                Err(err) => log::warn!(
                    "Keychain lookup failed for SSH tunnel of '{}': {err}",
                    favorite.name
                ),
            }
        }

        let snapshot = Snapshot {
            timestamp: now.to_rfc3339(),
            favorites,
            passwords,
        };
        let secrets_found = snapshot.passwords.len();

        log::info!("Saving backup '{title}' to vault '{}'", self.config.vault);
        let body = serde_json::to_string_pretty(&snapshot)?;
        let item_id = self.vault.create_document(&title, &body).await?;

        Ok(BackupReport {
            title,
            item_id,
            vault: self.config.vault.clone(),
            favorites: profile_count,
            secrets_found,
        })
    }

    /// Restore favorites and passwords from a backup. Without a title the
    /// most recent backup (greatest title) is used.
    pub async fn restore(&self, title: Option<&str>) -> Result<RestoreReport> {
        let title = self.resolve_title(title).await?;

        self.app.request_quit().await;

        log::info!(
            "Retrieving backup '{title}' from vault '{}'",
            self.config.vault
        );
        let snapshot = self.fetch_snapshot(&title).await?;
        let favorites = snapshot.favorites.root.children.len();

        log::info!("Restoring {favorites} favorites");
        let local_backup = self.repository.write(&snapshot.favorites)?;

        let secrets_total = snapshot.passwords.len();
        log::info!("Restoring {secrets_total} passwords to the keychain");
        let allowed_callers = self.allowed_callers();

        let mut secrets_restored = 0;
        for entry in snapshot.passwords.values() {
            match self
                .credentials
                .upsert(&entry.service, &entry.account, &entry.password, &allowed_callers)
                .await
            {
                Ok(()) => {
                    log::debug!("Restored password for {}", entry.account);
                    secrets_restored += 1;
                }
                Err(err) => {
                    log::warn!("Failed to restore password for {}: {err}", entry.account)
                }
            }
        }

        Ok(RestoreReport {
            title,
            favorites,
            secrets_restored,
            secrets_total,
            local_backup,
        })
    }

    /// List backup documents in the vault, most recent first.
    pub async fn list(&self) -> Result<Vec<VaultEntry>> {
        self.vault.list_documents().await
    }

    /// Fetch a snapshot for inspection, resolving the title like `restore`.
    pub async fn fetch(&self, title: Option<&str>) -> Result<(String, Snapshot)> {
        let title = self.resolve_title(title).await?;
        let snapshot = self.fetch_snapshot(&title).await?;
        Ok((title, snapshot))
    }

    /// Delete every favorite and every derivable keychain entry.
    ///
    /// Unless `skip_backup` is set, the prompt first offers a safety backup;
    /// if one is requested and fails, the clear aborts before any deletion.
    /// The destructive step then requires the prompt's exact confirmation
    /// token.
    pub async fn clear(
        &self,
        skip_backup: bool,
        prompt: &dyn ClearPrompt,
    ) -> Result<ClearOutcome> {
        let favorites = match self.repository.read() {
            Ok(document) => document,
            Err(BackupError::NotFound(_)) => {
                log::info!("No favorites file found, nothing to clear");
                return Ok(ClearOutcome::NothingToClear);
            }
            Err(err) => return Err(err),
        };

        let count = favorites.root.children.len();
        if count == 0 {
            log::info!("No favorites found to clear");
            return Ok(ClearOutcome::NothingToClear);
        }

        let safety_backup = if !skip_backup && prompt.offer_backup(count)? {
            let now = Local::now();
            let title = format!(
                "{BACKUP_TITLE_PREFIX} - Pre-Clear - {}",
                now.format(TITLE_TIMESTAMP)
            );
            log::info!("Creating safety backup before clearing");
            // A failed safety backup aborts the clear entirely.
            Some(self.backup_at(title, now).await?)
        } else {
            None
        };

        if !prompt.confirm_delete(count)? {
            log::info!("Clear cancelled at confirmation prompt");
            return Ok(ClearOutcome::Cancelled);
        }

        self.app.request_quit().await;

        log::info!("Deleting keychain entries for {count} favorites");
        let mut secrets_deleted = 0;
        for favorite in &favorites.root.children {
            let primary = keys::primary_ref(favorite);
            match self.credentials.delete(&primary.service, &primary.account).await {
                Ok(true) => {
                    log::debug!("Deleted password for '{}'", favorite.name);
                    secrets_deleted += 1;
                }
                Ok(false) => {}
                Err(err) => {
                    log::warn!("Failed to delete password for '{}': {err}", favorite.name)
                }
            }

            let Some(tunnel) = keys::tunnel_ref(favorite) else {
                continue;
            };
            match self.credentials.delete(&tunnel.service, &tunnel.account).await {
                Ok(true) => {
                    log::debug!("Deleted SSH password for '{}'", favorite.name);
                    secrets_deleted += 1;
                }
                Ok(false) => {}
                Err(err) => log::warn!(
                    "Failed to delete SSH password for '{}': {err}",
                    favorite.name
                ),
            }
        }

        log::info!("Clearing favorites file");
        self.repository.write(&FavoritesDocument::empty())?;

        Ok(ClearOutcome::Cleared {
            favorites: count,
            secrets_deleted,
            safety_backup,
        })
    }

    async fn resolve_title(&self, title: Option<&str>) -> Result<String> {
        if let Some(title) = title {
            return Ok(title.to_string());
        }
        log::info!("No backup title specified, finding most recent backup");
        let backups = self.vault.list_documents().await?;
        let newest = backups.into_iter().next().ok_or_else(|| {
            BackupError::NotFound(format!(
                "Sequel Ace backups in vault '{}'. Run 'backup' first",
                self.config.vault
            ))
        })?;
        log::info!("Found most recent backup: {}", newest.title);
        Ok(newest.title)
    }

    async fn fetch_snapshot(&self, title: &str) -> Result<Snapshot> {
        let body = self.vault.get_document_body(title).await?;
        serde_json::from_str(&body).map_err(|err| BackupError::parse("backup snapshot", err))
    }

    fn allowed_callers(&self) -> Vec<&str> {
        // The client binary, the security tool, and "" for the invoking
        // process itself.
        vec![self.config.client_binary.as_str(), "/usr/bin/security", ""]
    }
}
