//! Pluggable question front-ends
//!
//! The dialogue only ever talks to the `Frontend` trait; which concrete
//! front-end answers is decided exactly once at startup, by an explicit
//! priority list.

pub mod line;
pub mod zenity;

use clap::ValueEnum;
use tracing::info;

use crate::error::SetupError;

/// Outcome of posing one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Index into the offered options.
    Choice(usize),
    Cancelled,
}

/// A presentation capability: pose a question, report a fatal error.
pub trait Frontend {
    /// Poses `prompt` with the given ordered options and returns the chosen
    /// index, or `Cancelled`. Implementations must only return indices that
    /// are in range.
    fn ask(&self, prompt: &str, options: &[String]) -> Result<Answer, SetupError>;

    /// Shows a fatal error to the user.
    fn report_error(&self, message: &str);
}

/// Which front-end to use, as selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrontendChoice {
    /// First available front-end, in priority order
    Auto,
    /// Terminal line prompt
    Line,
    /// Zenity list dialogs
    Zenity,
}

/// Resolves the front-end once; the result is threaded through the run
/// explicitly and never re-probed.
pub fn resolve(choice: FrontendChoice) -> Result<Box<dyn Frontend>, SetupError> {
    match choice {
        FrontendChoice::Auto => {
            if zenity::ZenityFrontend::available() {
                info!("using zenity front-end");
                return Ok(Box::new(zenity::ZenityFrontend));
            }
            info!("using line front-end");
            Ok(Box::new(line::LineFrontend))
        }
        FrontendChoice::Line => Ok(Box::new(line::LineFrontend)),
        FrontendChoice::Zenity => {
            if zenity::ZenityFrontend::available() {
                Ok(Box::new(zenity::ZenityFrontend))
            } else {
                Err(SetupError::Configuration(
                    "zenity front-end requested, but zenity is not available".into(),
                ))
            }
        }
    }
}
