//! Best-effort control of the Sequel Ace application.
//!
//! The client owns the favorites file while it runs, so restore and clear ask
//! it to quit first. Failure here only means the operator may have to
//! reconnect manually, so it is logged and never fatal.

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;

/// Display name of the client application, as AppleScript addresses it.
pub const CLIENT_APP_NAME: &str = "Sequel Ace";

/// Binary granted keychain access when secrets are restored. The actual
/// executable, not the .app bundle, or the access grant does not take.
pub const CLIENT_BINARY: &str = "/Applications/Sequel Ace.app/Contents/MacOS/Sequel Ace";

/// Port for asking the owning client application to terminate.
#[async_trait]
pub trait AppController: Send + Sync {
    /// Ask the client to quit. Best-effort; never fails.
    async fn request_quit(&self);
}

/// Controller that sends a quit Apple event through `osascript`.
pub struct OsascriptController;

#[async_trait]
impl AppController for OsascriptController {
    async fn request_quit(&self) {
        let script = format!("tell application \"{CLIENT_APP_NAME}\" to quit");
        match Command::new("osascript").args(["-e", &script]).output().await {
            Ok(output) if output.status.success() => {
                log::info!("{CLIENT_APP_NAME} has been quit");
                // Give the app a moment to fully close before touching its files.
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Ok(output) => {
                log::warn!(
                    "Could not quit {CLIENT_APP_NAME}: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Err(err) => {
                log::warn!("Could not quit {CLIENT_APP_NAME}: {err}");
            }
        }
    }
}
