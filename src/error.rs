use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can end a configuration run.
///
/// User cancellation is not represented here: the dialogue reports it as a
/// clean `Ok(None)` outcome.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The topology report was malformed beyond recovery, e.g. it listed the
    /// same connector twice.
    #[error("topology report violates protocol: {0}")]
    ProtocolViolation(String),

    /// An external command (the topology reporter or the reconfiguration
    /// call) exited with a non-zero status.
    #[error("`{command}` failed: {status}")]
    Process { command: String, status: ExitStatus },

    /// A condition that has to be fixed by the user: connector configuration,
    /// unavailable front-end, unusable command-line combination.
    #[error("{0}")]
    Configuration(String),

    /// The preference store was written by a newer version of this program.
    #[error("preference store has version {found}, but only versions up to {supported} are understood; please update screendock")]
    IncompatibleStoreVersion { found: i64, supported: i64 },

    #[error("preference store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
