//! Reconfiguration command synthesis and execution
//!
//! Turns a chosen `ScreenSetup` plus the probed topology into the ordered
//! per-connector xrandr argument lists, and runs the resulting call.

use std::process::Command;

use tracing::{info, warn};

use crate::error::SetupError;
use crate::topology::ScreenSituation;
use crate::types::ScreenSetup;

/// Arguments for one `--output` group of the reconfiguration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCommand {
    pub connector: String,
    pub args: Vec<String>,
}

/// Builds one command per known connector, in discovery order. Connectors
/// not named by the setup are switched off.
pub fn synthesize(
    setup: &ScreenSetup,
    situation: &ScreenSituation,
) -> Result<Vec<OutputCommand>, SetupError> {
    let mut commands: Vec<OutputCommand> = situation
        .connectors
        .iter()
        .map(|c| OutputCommand {
            connector: c.name.clone(),
            args: vec!["--off".to_string()],
        })
        .collect();

    if let Some(resolution) = setup.internal {
        let mut args = vec!["--mode".to_string(), resolution.mode_string()];
        if !setup.external_is_primary {
            args.push("--primary".to_string());
        }
        commands[situation.internal_index()].args = args;
    }

    match situation.external_index() {
        Some(external) => {
            if let Some(resolution) = setup.external {
                let mut args = vec!["--mode".to_string(), resolution.mode_string()];
                if setup.external_is_primary {
                    args.push("--primary".to_string());
                }
                if setup.internal.is_some() {
                    let position = setup.position.ok_or_else(|| {
                        SetupError::Configuration(
                            "both displays are enabled but no relative position was chosen".into(),
                        )
                    })?;
                    args.push(position.xrandr_flag().to_string());
                    args.push(situation.internal().name.clone());
                }
                commands[external].args = args;
            }
        }
        None => {
            if setup.external.is_some() {
                return Err(SetupError::Configuration(
                    "there is no external display to set a resolution for".into(),
                ));
            }
        }
    }

    Ok(commands)
}

/// Flattens the per-connector commands into the literal xrandr invocation.
pub fn to_argv(commands: &[OutputCommand]) -> Vec<String> {
    let mut argv = vec!["xrandr".to_string()];
    for command in commands {
        argv.push("--output".to_string());
        argv.push(command.connector.clone());
        argv.extend(command.args.iter().cloned());
    }
    argv
}

/// Runs the reconfiguration call. Once dispatched it cannot be aborted;
/// only the exit status is checked afterwards.
pub fn apply(commands: &[OutputCommand]) -> Result<(), SetupError> {
    let argv = to_argv(commands);
    info!(command = %argv.join(" "), "applying display configuration");
    let output = Command::new(&argv[0]).args(&argv[1..]).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!(stderr = %stderr.trim(), "xrandr reported errors");
        }
        return Err(SetupError::Process {
            command: argv.join(" "),
            status: output.status,
        });
    }
    Ok(())
}
