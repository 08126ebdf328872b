//! Backup and restore of Sequel Ace connection favorites.
//!
//! The favorites plist, the macOS keychain secrets each favorite owns, and a
//! 1Password vault are three independently-failing stores; this crate ties
//! them together so a backup is one self-contained, restorable snapshot and
//! destructive operations are gated behind explicit confirmation.

pub mod app;
pub mod error;
pub mod keychain;
pub mod keys;
pub mod model;
pub mod orchestrator;
pub mod repository;
pub mod vault;

pub use app::{AppController, CLIENT_APP_NAME, CLIENT_BINARY, OsascriptController};
pub use error::{BackupError, Result};
pub use keychain::{CredentialStore, SecurityCommand};
pub use model::{
    ConnectionKind, Favorite, FavoritesDocument, FavoritesRoot, PasswordEntry, SecretKind,
    Snapshot,
};
pub use orchestrator::{
    BackupConfig, BackupOrchestrator, BackupReport, ClearOutcome, ClearPrompt, RestoreReport,
};
pub use repository::FavoritesRepository;
pub use vault::{
    BACKUP_TAG, BACKUP_TITLE_PREFIX, DEFAULT_VAULT, OnePasswordCli, VaultClient, VaultEntry,
};
