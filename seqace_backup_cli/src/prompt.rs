//! Interactive confirmation gates for the clear flow.

use colored::*;
use dialoguer::{Confirm, Input};
use seqace_backup_core::{ClearPrompt, Result};

/// The literal token required before anything is deleted.
const CONFIRMATION_TOKEN: &str = "DELETE";

/// Words that cancel the clear, matched case-insensitively.
const CANCEL_WORDS: &[&str] = &["n", "no", "cancel", "quit", "exit"];

/// How one line of confirmation input is interpreted.
#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Confirmed,
    Cancelled,
    /// Neither the token nor a cancel word; ask again rather than treating a
    /// typo as a cancellation.
    Retry,
}

fn classify_answer(input: &str) -> Answer {
    let trimmed = input.trim();
    if trimmed == CONFIRMATION_TOKEN {
        return Answer::Confirmed;
    }
    if CANCEL_WORDS.contains(&trimmed.to_lowercase().as_str()) {
        return Answer::Cancelled;
    }
    Answer::Retry
}

/// Terminal-backed prompt. All questions default to the safe answer.
pub struct TerminalPrompt;

impl ClearPrompt for TerminalPrompt {
    fn offer_backup(&self, favorites: usize) -> Result<bool> {
        println!(
            "{}",
            format!(
                "⚠️  This will delete all {favorites} favorites and their keychain passwords."
            )
            .yellow()
            .bold()
        );
        Confirm::new()
            .with_prompt("Create a backup in 1Password first?")
            .default(true)
            .interact()
            .map_err(into_backup_error)
    }

    fn confirm_delete(&self, favorites: usize) -> Result<bool> {
        println!();
        println!("{}", "Final confirmation required.".red().bold());
        println!(
            "Type {} to permanently delete {favorites} favorites, or 'no' to cancel.",
            CONFIRMATION_TOKEN.red().bold()
        );

        loop {
            let answer: String = Input::new()
                .with_prompt("Confirmation")
                .allow_empty(true)
                .interact_text()
                .map_err(into_backup_error)?;

            match classify_answer(&answer) {
                Answer::Confirmed => return Ok(true),
                Answer::Cancelled => return Ok(false),
                Answer::Retry => {
                    println!(
                        "Please type {CONFIRMATION_TOKEN} exactly to confirm, or 'no' to cancel."
                    );
                }
            }
        }
    }
}

fn into_backup_error(err: dialoguer::Error) -> seqace_backup_core::BackupError {
    let dialoguer::Error::IO(io_err) = err;
    seqace_backup_core::BackupError::Io(io_err)
}
