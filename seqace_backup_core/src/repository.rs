//! Favorites file access with copy-before-overwrite protection.

use crate::error::{BackupError, Result};
use crate::model::FavoritesDocument;
use std::path::{Path, PathBuf};

/// Suffix of the local safety copy written before any overwrite. This is
/// independent of the vault-based backups.
const LOCAL_BACKUP_EXTENSION: &str = "plist.backup";

/// Container-relative location of the favorites file.
const FAVORITES_RELATIVE_PATH: &str = "Library/Containers/com.sequel-ace.sequel-ace/Data/Library/Application Support/Sequel Ace/Data/Favorites.plist";

/// Reads and writes the binary plist holding the ordered list of connection
/// profiles.
pub struct FavoritesRepository {
    path: PathBuf,
}

impl FavoritesRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default Sequel Ace favorites location for the current user.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(FAVORITES_RELATIVE_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the favorites document.
    ///
    /// A missing file is a typed `NotFound`; an existing file with zero
    /// favorites is a valid document, not an error.
    pub fn read(&self) -> Result<FavoritesDocument> {
        if !self.path.exists() {
            return Err(BackupError::NotFound(format!(
                "favorites file at {}. Is Sequel Ace installed and have you created any favorites?",
                self.path.display()
            )));
        }
        Ok(plist::from_file(&self.path)?)
    }

    /// Overwrite the favorites document.
    ///
    /// An existing file is first copied verbatim to a sibling backup path;
    /// the returned path names that copy when one was made. Parent
    /// directories are created if absent.
    pub fn write(&self, document: &FavoritesDocument) -> Result<Option<PathBuf>> {
        let local_backup = if self.path.exists() {
            let backup_path = self.path.with_extension(LOCAL_BACKUP_EXTENSION);
            std::fs::copy(&self.path, &backup_path)?;
            log::info!(
                "Created backup of existing favorites at {}",
                backup_path.display()
            );
            Some(backup_path)
        } else {
            None
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        plist::to_file_binary(&self.path, document)?;
        Ok(local_backup)
    }
}
