//! Sending long output through the user's pager.

use crate::config::Config;
use crate::error::{Error, Result};
use std::io::{self, IsTerminal, Write};
use std::process::{Command, Stdio};

/// Pager used when neither the config nor `$PAGER` names one.
pub const DEFAULT_PAGER: &str = "less -R";

/// The pager command line: config, then `$PAGER`, then [`DEFAULT_PAGER`].
#[must_use]
pub fn pager_command(config: &Config, env_pager: Option<&str>) -> String {
    config
        .pager
        .as_deref()
        .or(env_pager)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PAGER)
        .to_string()
}

/// Pipe `text` into `command`, waiting for the pager to exit.
///
/// The pager closing its input early (the user quit) is not an error.
///
/// # Errors
///
/// Returns an error if the command is empty or cannot be started.
pub fn page(text: &str, command: &str) -> Result<()> {
    let mut words = command.split_whitespace();
    let program = words.next().ok_or_else(|| Error::Config("pager command is empty".to_string()))?;

    let mut child = Command::new(program).args(words).stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(text.as_bytes()) {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }
    }
    child.wait()?;
    Ok(())
}

/// Print `text`, through `pager` when one is given and stdout is a terminal.
///
/// Falls back to printing directly if the pager cannot be started.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn show(text: &str, pager: Option<&str>) -> Result<()> {
    if let Some(command) = pager.filter(|_| io::stdout().is_terminal()) {
        match page(text, command) {
            Ok(()) => return Ok(()),
            Err(e) => tracing::warn!(pager = command, error = %e, "pager failed, printing directly"),
        }
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
