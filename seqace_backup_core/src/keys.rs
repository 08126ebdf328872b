//! Deterministic mapping from a profile to its keychain keys.
//!
//! Pure functions, no I/O. These must reproduce the keys Sequel Ace itself
//! writes, or lookups silently come back empty.

use crate::model::{ConnectionKind, Favorite};

/// Service prefix Sequel Ace uses for primary connection passwords.
pub const SERVICE_PREFIX: &str = "Sequel Ace : ";

/// Service prefix Sequel Ace uses for SSH tunnel passwords.
pub const TUNNEL_SERVICE_PREFIX: &str = "Sequel Ace SSHTunnel : ";

/// A (service, account) pair addressing one keychain entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeychainRef {
    pub service: String,
    pub account: String,
}

/// Keys for a profile's primary connection password. Always derivable.
///
/// The account is `user@host/database`, or `user@host/` when no database is
/// selected. The trailing slash is significant: it distinguishes "no database
/// selected" from a database literally named the empty string.
pub fn primary_ref(favorite: &Favorite) -> KeychainRef {
    let account = match favorite.database.as_deref() {
        Some(db) if !db.is_empty() => {
            format!("{}@{}/{}", favorite.user, favorite.host, db)
        }
        _ => format!("{}@{}/", favorite.user, favorite.host),
    };
    KeychainRef {
        service: format!(
            "{SERVICE_PREFIX}{} ({})",
            favorite.name, favorite.id
        ),
        account,
    }
}

/// Keys for a profile's SSH tunnel password.
///
/// Defined only when the profile is an SSH tunnel with both ssh fields
/// non-empty; otherwise `None`, and callers skip the tunnel lookup entirely
/// rather than querying empty keys.
pub fn tunnel_ref(favorite: &Favorite) -> Option<KeychainRef> {
    if favorite.kind != ConnectionKind::SshTunnel {
        return None;
    }
    match (favorite.ssh_user.as_deref(), favorite.ssh_host.as_deref()) {
        (Some(user), Some(host)) if !user.is_empty() && !host.is_empty() => Some(KeychainRef {
            service: format!(
                "{TUNNEL_SERVICE_PREFIX}{} ({})",
                favorite.name, favorite.id
            ),
            account: format!("{user}@{host}"),
        }),
        _ => None,
    }
}

/// Snapshot password-map key for a profile's primary entry.
pub fn entry_id(favorite: &Favorite) -> String {
    favorite.id.to_string()
}

/// Snapshot password-map key for a profile's tunnel entry.
pub fn tunnel_entry_id(favorite: &Favorite) -> String {
    format!("{}_ssh", favorite.id)
}
