//! 1Password access through the `op` command-line tool.
//!
//! Backups live in one vault as Secure Notes carrying a fixed classification
//! tag; the snapshot JSON goes into the `notesPlain` field.

use crate::error::{BackupError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// Tag marking backup documents created by this tool.
pub const BACKUP_TAG: &str = "sequel-ace-backup";

/// Title prefix shared by all backup documents.
pub const BACKUP_TITLE_PREFIX: &str = "Sequel Ace Backup";

/// Vault used when the caller does not name one.
pub const DEFAULT_VAULT: &str = "Private";

/// One backup document as seen in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEntry {
    pub id: String,
    pub title: String,
    pub created_at: String,
}

/// Port for the remote vault holding backup documents.
#[async_trait]
pub trait VaultClient: Send + Sync {
    /// Fail fast if the vault transport is missing or not authenticated.
    /// Called once at startup, before any operation.
    async fn ensure_ready(&self) -> Result<()>;

    /// Create a tagged document and return its id.
    async fn create_document(&self, title: &str, body: &str) -> Result<String>;

    /// Fetch a document body by title.
    async fn get_document_body(&self, title: &str) -> Result<String>;

    /// List tagged backup documents, greatest title first. An empty vault
    /// yields an empty listing, not an error.
    async fn list_documents(&self) -> Result<Vec<VaultEntry>>;
}

#[derive(Debug, Deserialize)]
struct OpItem {
    id: String,
    title: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    fields: Vec<OpField>,
}

#[derive(Debug, Deserialize)]
struct OpField {
    #[serde(default)]
    id: String,
    #[serde(default)]
    value: Option<String>,
}

/// Vault client backed by the 1Password CLI.
pub struct OnePasswordCli {
    vault: String,
}

impl OnePasswordCli {
    pub fn new(vault: impl Into<String>) -> Self {
        Self {
            vault: vault.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("op").args(args).output().await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                BackupError::Setup(
                    "1Password CLI is not installed. Please install it from: \
                     https://developer.1password.com/docs/cli/get-started/"
                        .to_string(),
                )
            } else {
                BackupError::transport("op", err.to_string())
            }
        })?;

        if !output.status.success() {
            return Err(BackupError::transport(
                "op",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn parse_item(json: &str, context: &'static str) -> Result<OpItem> {
    serde_json::from_str(json).map_err(|err| BackupError::parse(context, err))
}

fn extract_notes(item: OpItem, title: &str) -> Result<String> {
    item.fields
        .into_iter()
        .find(|field| field.id == "notesPlain")
        .and_then(|field| field.value)
        .filter(|notes| !notes.is_empty())
        .ok_or_else(|| BackupError::NotFound(format!("backup data in item '{title}'")))
}

fn into_listing(items: Vec<OpItem>) -> Vec<VaultEntry> {
    let mut entries: Vec<VaultEntry> = items
        .into_iter()
        .filter(|item| item.title.starts_with(BACKUP_TITLE_PREFIX))
        .map(|item| VaultEntry {
            id: item.id,
            title: item.title,
            created_at: item.created_at.unwrap_or_else(|| "unknown".to_string()),
        })
        .collect();
    // Titles are timestamp-prefixed, so string order is chronological order.
    entries.sort_by(|a, b| b.title.cmp(&a.title));
    entries
}

#[async_trait]
impl VaultClient for OnePasswordCli {
    async fn ensure_ready(&self) -> Result<()> {
        let accounts = self.run(&["account", "list"]).await.map_err(|err| match err {
            BackupError::Transport { message, .. } => BackupError::Setup(format!(
                "1Password CLI error: {message}. Please run: op signin"
            )),
            other => other,
        })?;

        if accounts.is_empty() {
            return Err(BackupError::Setup(
                "1Password CLI is not signed in. Please run: op signin".to_string(),
            ));
        }
        Ok(())
    }

    async fn create_document(&self, title: &str, body: &str) -> Result<String> {
        let notes_field = format!("notesPlain={body}");
        let stdout = self
            .run(&[
                "item",
                "create",
                "--category",
                "Secure Note",
                "--title",
                title,
                "--vault",
                &self.vault,
                "--tags",
                BACKUP_TAG,
                "--format",
                "json",
                &notes_field,
            ])
            .await?;

        let item = parse_item(&stdout, "op item create response")?;
        Ok(item.id)
    }

    async fn get_document_body(&self, title: &str) -> Result<String> {
        let stdout = self
            .run(&["item", "get", title, "--vault", &self.vault, "--format", "json"])
            .await?;

        let item = parse_item(&stdout, "op item get response")?;
        extract_notes(item, title)
    }

    async fn list_documents(&self) -> Result<Vec<VaultEntry>> {
        let stdout = self
            .run(&[
                "item",
                "list",
                "--vault",
                &self.vault,
                "--tags",
                BACKUP_TAG,
                "--format",
                "json",
            ])
            .await?;

        if stdout.is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<OpItem> =
            serde_json::from_str(&stdout).map_err(|err| BackupError::parse("op item list response", err))?;
        Ok(into_listing(items))
    }
}
