//! Data model: the favorites document, connection profiles, and backup
//! snapshots.
//!
//! Profiles are typed records, but Sequel Ace writes many keys this tool does
//! not interpret; those are captured verbatim in `extra` maps so a
//! read-modify-write cycle round-trips the file untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Connection kind, stored by Sequel Ace as the integer `type` field.
///
/// Unknown integers are preserved so profiles written by a newer client
/// survive a backup/restore cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ConnectionKind {
    Standard,
    Socket,
    SshTunnel,
    Other(i64),
}

impl Default for ConnectionKind {
    fn default() -> Self {
        Self::Standard
    }
}

impl From<i64> for ConnectionKind {
    fn from(raw: i64) -> Self {
        match raw {
            0 => Self::Standard,
            1 => Self::Socket,
            2 => Self::SshTunnel,
            other => Self::Other(other),
        }
    }
}

impl From<ConnectionKind> for i64 {
    fn from(kind: ConnectionKind) -> Self {
        match kind {
            ConnectionKind::Standard => 0,
            ConnectionKind::Socket => 1,
            ConnectionKind::SshTunnel => 2,
            ConnectionKind::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard"),
            Self::Socket => write!(f, "Socket"),
            Self::SshTunnel => write!(f, "SSH Tunnel"),
            Self::Other(raw) => write!(f, "Other ({raw})"),
        }
    }
}

/// One saved connection profile ("favorite").
///
/// `id` is assigned by Sequel Ace and stays stable across edits; it anchors
/// both keychain keys and snapshot password entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub user: String,

    /// Absent means "use the default database", never an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: ConnectionKind,

    #[serde(rename = "sshHost", default, skip_serializing_if = "Option::is_none")]
    pub ssh_host: Option<String>,

    #[serde(rename = "sshUser", default, skip_serializing_if = "Option::is_none")]
    pub ssh_user: Option<String>,

    /// Keys Sequel Ace stores that this tool does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, plist::Value>,
}

impl Favorite {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            host: String::new(),
            user: String::new(),
            database: None,
            kind: ConnectionKind::Standard,
            ssh_host: None,
            ssh_user: None,
            extra: BTreeMap::new(),
        }
    }
}

/// The single root container the favorites file serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritesRoot {
    #[serde(rename = "Children", default)]
    pub children: Vec<Favorite>,

    #[serde(rename = "IsExpanded", default = "default_expanded")]
    pub is_expanded: bool,

    #[serde(rename = "Name", default = "root_name")]
    pub name: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, plist::Value>,
}

fn default_expanded() -> bool {
    true
}

fn root_name() -> String {
    "Favorites Root".to_string()
}

/// Top-level structure of `Favorites.plist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritesDocument {
    #[serde(rename = "Favorites Root")]
    pub root: FavoritesRoot,

    #[serde(flatten)]
    pub extra: BTreeMap<String, plist::Value>,
}

impl FavoritesDocument {
    /// An empty-but-valid document, written back by the clear operation.
    pub fn empty() -> Self {
        Self {
            root: FavoritesRoot {
                children: Vec::new(),
                is_expanded: true,
                name: root_name(),
                extra: BTreeMap::new(),
            },
            extra: BTreeMap::new(),
        }
    }
}

/// Which credential a snapshot password entry holds.
///
/// Serialized as the original tool's wire strings so old backups restore
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecretKind {
    #[serde(rename = "mysql")]
    Primary,
    #[serde(rename = "ssh")]
    Tunnel,
}

impl Default for SecretKind {
    fn default() -> Self {
        Self::Primary
    }
}

/// One extracted secret inside a snapshot, addressed by the keychain keys it
/// was read from.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordEntry {
    /// Backups written by very old tool versions omit the service; restore
    /// falls back to the bare client service name.
    #[serde(default = "legacy_service")]
    pub service: String,

    pub account: String,

    pub password: String,

    #[serde(rename = "type", default)]
    pub kind: SecretKind,
}

fn legacy_service() -> String {
    "Sequel Ace".to_string()
}

impl fmt::Debug for PasswordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordEntry")
            .field("service", &self.service)
            .field("account", &self.account)
            .field("password", &"***")
            .field("kind", &self.kind)
            .finish()
    }
}

/// The self-contained backup artifact: the favorites document verbatim plus a
/// best-effort map of extracted secrets.
///
/// `passwords` is a partial map; a profile may have zero, one, or two entries
/// and completeness is never guaranteed. Keys are the profile id as a decimal
/// string, with an `_ssh` suffix for tunnel entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: String,
    pub favorites: FavoritesDocument,
    #[serde(default)]
    pub passwords: BTreeMap<String, PasswordEntry>,
}
