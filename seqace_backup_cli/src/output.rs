//! Terminal rendering of operation reports. Secrets never reach this module's
//! output; only their presence is shown.

use colored::*;
use seqace_backup_core::keys;
use seqace_backup_core::vault::VaultEntry;
use seqace_backup_core::{BackupReport, ClearOutcome, ConnectionKind, RestoreReport, Snapshot};

pub fn print_backup_report(report: &BackupReport) {
    println!("{}", "✓ Backup complete".green().bold());
    println!("  Title:     {}", report.title);
    println!("  Vault:     {}", report.vault);
    println!("  Item ID:   {}", report.item_id);
    println!("  Favorites: {}", report.favorites);
    println!("  Passwords: {}", report.secrets_found);

    if report.secrets_found < report.favorites {
        println!(
            "{}",
            format!(
                "  Note: {} favorite(s) had no stored password",
                report.favorites - report.secrets_found
            )
            .yellow()
        );
    }
}

pub fn print_restore_report(report: &RestoreReport) {
    println!("{}", "✓ Restore complete".green().bold());
    println!("  From:      {}", report.title);
    println!("  Favorites: {}", report.favorites);
    println!(
        "  Passwords: {}/{}",
        report.secrets_restored, report.secrets_total
    );
    if let Some(path) = &report.local_backup {
        println!("  Previous favorites saved to {}", path.display());
    }

    if report.secrets_restored < report.secrets_total {
        println!(
            "{}",
            format!(
                "  Warning: {} password(s) could not be written to the keychain",
                report.secrets_total - report.secrets_restored
            )
            .yellow()
        );
    }
    println!();
    println!("Restart Sequel Ace to pick up the restored favorites.");
}

pub fn print_listing(vault: &str, entries: &[VaultEntry]) {
    if entries.is_empty() {
        println!("No Sequel Ace backups found in vault '{vault}'.");
        println!("Run 'seqace-backup backup' to create one.");
        return;
    }

    println!(
        "{}",
        format!("{} backup(s) in vault '{vault}':", entries.len()).bold()
    );
    for entry in entries {
        println!("  {}  (created {})", entry.title, entry.created_at.dimmed());
    }
}

pub fn print_snapshot(title: &str, snapshot: &Snapshot) {
    print!("{}", render_snapshot(title, snapshot));
}

fn presence_mark(present: bool) -> ColoredString {
    if present { "✓".green() } else { "✗".red() }
}

fn render_snapshot(title: &str, snapshot: &Snapshot) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "{}", title.bold());
    let _ = writeln!(out, "  Taken:     {}", snapshot.timestamp);
    let _ = writeln!(
        out,
        "  Favorites: {}",
        snapshot.favorites.root.children.len()
    );
    let _ = writeln!(out);

    for favorite in &snapshot.favorites.root.children {
        let has_primary = snapshot.passwords.contains_key(&keys::entry_id(favorite));

        let _ = writeln!(out, "  {} [{}]", favorite.name.bold(), favorite.kind);
        let _ = writeln!(
            out,
            "    Connection: {} {}@{}",
            presence_mark(has_primary),
            favorite.user,
            favorite.host
        );
        match favorite.database.as_deref() {
            Some(database) if !database.is_empty() => {
                let _ = writeln!(out, "    Database:   {database}");
            }
            _ => {}
        }
        // Every tunnel profile gets an SSH line, even when its password is
        // missing from the snapshot.
        if favorite.kind == ConnectionKind::SshTunnel {
            let has_tunnel = snapshot
                .passwords
                .contains_key(&keys::tunnel_entry_id(favorite));
            let _ = writeln!(
                out,
                "    SSH:        {} {}@{}",
                presence_mark(has_tunnel),
                favorite.ssh_user.as_deref().unwrap_or(""),
                favorite.ssh_host.as_deref().unwrap_or("")
            );
        }
    }
    out
}

pub fn print_clear_outcome(outcome: &ClearOutcome) {
    match outcome {
        ClearOutcome::NothingToClear => {
            println!("No favorites found, nothing to clear.");
        }
        ClearOutcome::Cancelled => {
            println!("{}", "Clear cancelled, nothing was deleted.".yellow());
        }
        ClearOutcome::Cleared {
            favorites,
            secrets_deleted,
            safety_backup,
        } => {
            if let Some(report) = safety_backup {
                println!(
                    "Safety backup '{}' saved to vault '{}'.",
                    report.title, report.vault
                );
            }
            println!("{}", "✓ Clear complete".green().bold());
            println!("  Favorites removed: {favorites}");
            println!("  Keychain entries deleted: {secrets_deleted}");
        }
    }
}
