//! User-presence confirmation for the software credential store.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use biocipher_service::{ConsentPrompt, KeyCredentialStatus};

use crate::config::ConsentMode;

/// Asks the user to approve one credential operation.
#[async_trait]
pub trait ConsentGate: Send + Sync {
    /// # Errors
    ///
    /// `UserCanceled` on refusal, `UserPrefersPassword` if the user asked for
    /// the password fallback, `UnknownError` if no prompt could be shown.
    async fn confirm(&self, prompt: &ConsentPrompt) -> Result<(), KeyCredentialStatus>;
}

/// Approves everything. For unattended test rigs only.
pub struct AutoApprove;

#[async_trait]
impl ConsentGate for AutoApprove {
    async fn confirm(&self, _prompt: &ConsentPrompt) -> Result<(), KeyCredentialStatus> {
        Ok(())
    }
}

/// Refuses everything, as if the user dismissed the prompt.
pub struct Deny;

#[async_trait]
impl ConsentGate for Deny {
    async fn confirm(&self, _prompt: &ConsentPrompt) -> Result<(), KeyCredentialStatus> {
        Err(KeyCredentialStatus::UserCanceled)
    }
}

/// Asks on the controlling terminal, since stdin carries requests.
pub struct TerminalConsent {
    tty: PathBuf,
}

impl TerminalConsent {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tty: PathBuf::from("/dev/tty"),
        }
    }

    /// Map a typed answer to an outcome.
    ///
    /// # Errors
    ///
    /// `UserPrefersPassword` for `p`, `UserCanceled` for anything but yes.
    pub fn interpret(answer: &str) -> Result<(), KeyCredentialStatus> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(()),
            "p" | "password" => Err(KeyCredentialStatus::UserPrefersPassword),
            _ => Err(KeyCredentialStatus::UserCanceled),
        }
    }

    fn ask(tty: &Path, title: &str, description: &str) -> std::io::Result<String> {
        let mut terminal = OpenOptions::new().read(true).write(true).open(tty)?;
        write!(
            terminal,
            "\n{title}\n{description}\nApprove? [y/N, p = use password] "
        )?;
        terminal.flush()?;
        let mut answer = String::new();
        BufReader::new(terminal).read_line(&mut answer)?;
        Ok(answer)
    }
}

impl Default for TerminalConsent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConsentGate for TerminalConsent {
    async fn confirm(&self, prompt: &ConsentPrompt) -> Result<(), KeyCredentialStatus> {
        let tty = self.tty.clone();
        let title = prompt.title.clone();
        let description = prompt.description.clone();

        let answer = tokio::task::spawn_blocking(move || Self::ask(&tty, &title, &description))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "consent prompt task failed");
                KeyCredentialStatus::UnknownError
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "cannot open terminal for consent prompt");
                KeyCredentialStatus::UnknownError
            })?;

        let outcome = Self::interpret(&answer);
        tracing::debug!(approved = outcome.is_ok(), "consent prompt answered");
        outcome
    }
}

/// Gate for a configured mode.
#[must_use]
pub fn create_consent_gate(mode: ConsentMode) -> Box<dyn ConsentGate> {
    match mode {
        ConsentMode::AutoApprove => Box::new(AutoApprove),
        ConsentMode::Deny => Box::new(Deny),
        ConsentMode::Terminal => Box::new(TerminalConsent::new()),
    }
}
