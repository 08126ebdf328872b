//! OS credential store access through the `security(1)` command.

use crate::error::{BackupError, Result};
use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;

/// Port for the OS credential store, keyed by (service, account).
///
/// Absence of an entry is a normal outcome for `lookup` and `delete`; the
/// implementations fail only when the store itself is unreachable.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a secret. `Ok(None)` means no entry, never an error.
    async fn lookup(&self, service: &str, account: &str) -> Result<Option<String>>;

    /// Insert or replace a secret, granting access to `allowed_callers` so
    /// the client application is not prompted on first connect. Re-running
    /// with the same keys is safe.
    async fn upsert(
        &self,
        service: &str,
        account: &str,
        secret: &str,
        allowed_callers: &[&str],
    ) -> Result<()>;

    /// Delete a secret. `Ok(true)` if an entry was removed, `Ok(false)` if
    /// there was nothing to remove.
    async fn delete(&self, service: &str, account: &str) -> Result<bool>;
}

/// Credential store backed by the macOS `security` command-line tool.
pub struct SecurityCommand;

impl SecurityCommand {
    async fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("security")
            .args(args)
            .output()
            .await
            .map_err(|err| BackupError::transport("security", err.to_string()))
    }
}

#[async_trait]
impl CredentialStore for SecurityCommand {
    async fn lookup(&self, service: &str, account: &str) -> Result<Option<String>> {
        let output = self
            .run(&["find-generic-password", "-s", service, "-a", account, "-w"])
            .await?;
        if !output.status.success() {
            // `security` exits non-zero for a missing entry; the exact code
            // is not stable enough to separate from access failures.
            return Ok(None);
        }
        let secret = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(secret))
    }

    async fn upsert(
        &self,
        service: &str,
        account: &str,
        secret: &str,
        allowed_callers: &[&str],
    ) -> Result<()> {
        // Drop any existing entry first, ignoring the result, so re-running
        // a restore is safe.
        let _ = self.delete(service, account).await;

        let mut args = vec!["add-generic-password", "-s", service, "-a", account, "-w", secret];
        for caller in allowed_callers {
            args.push("-T");
            args.push(*caller);
        }
        args.push("-U");

        let output = self.run(&args).await?;
        if !output.status.success() {
            return Err(BackupError::transport(
                "security",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    async fn delete(&self, service: &str, account: &str) -> Result<bool> {
        let output = self
            .run(&["delete-generic-password", "-s", service, "-a", account])
            .await?;
        Ok(output.status.success())
    }
}
