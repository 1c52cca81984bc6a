//! Zenity front-end
//!
//! Every question becomes a `zenity --list` invocation. Zenity exits
//! non-zero when the dialog is dismissed, which maps to a cancel; the
//! selected row comes back on stdout and is matched against the offered
//! options.

use std::process::Command;

use tracing::warn;

use super::{Answer, Frontend};
use crate::error::SetupError;

pub struct ZenityFrontend;

impl ZenityFrontend {
    /// Availability probe for the discovery priority list.
    pub fn available() -> bool {
        if std::env::var_os("DISPLAY").is_none() {
            return false;
        }
        Command::new("zenity")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

impl Frontend for ZenityFrontend {
    fn ask(&self, prompt: &str, options: &[String]) -> Result<Answer, SetupError> {
        let mut command = Command::new("zenity");
        command
            .arg("--list")
            .arg(format!("--text={prompt}"))
            .arg("--column=");
        for option in options {
            command.arg(option);
        }
        let output = command.output()?;
        if !output.status.success() {
            return Ok(Answer::Cancelled);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(selected) = stdout.lines().next().map(str::trim) else {
            return Ok(Answer::Cancelled);
        };
        match options.iter().position(|option| option == selected) {
            Some(index) => Ok(Answer::Choice(index)),
            None => {
                warn!(selected, "zenity returned an unknown selection, treating as cancel");
                Ok(Answer::Cancelled)
            }
        }
    }

    fn report_error(&self, message: &str) {
        let _ = Command::new("zenity")
            .arg("--error")
            .arg(format!("--text={message}"))
            .status();
    }
}
