//! The question-based configuration dialogue
//!
//! A bounded sequence of questions posed through the `Frontend` trait,
//! producing a `ScreenSetup`. Cancelling any question ends the whole flow
//! with `Ok(None)`: partial answers are discarded and the caller must
//! neither synthesize a command nor write the store.

use crate::error::SetupError;
use crate::frontend::{Answer, Frontend};
use crate::topology::{ScreenSituation, ranked_resolutions};
use crate::types::{RelativePosition, Resolution, ScreenSetup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationMode {
    InternalOnly,
    ExternalOnly,
    UseBoth,
}

impl OperationMode {
    fn text(self) -> &'static str {
        match self {
            OperationMode::InternalOnly => "Use internal display only",
            OperationMode::ExternalOnly => "Use external display only",
            OperationMode::UseBoth => "Use both displays",
        }
    }
}

/// Poses one question and maps the chosen index back onto the offered
/// values. `None` is the cancel outcome.
fn ask_option<T: Clone>(
    frontend: &dyn Frontend,
    prompt: &str,
    options: &[(String, T)],
) -> Result<Option<T>, SetupError> {
    let labels: Vec<String> = options.iter().map(|(label, _)| label.clone()).collect();
    match frontend.ask(prompt, &labels)? {
        Answer::Cancelled => Ok(None),
        Answer::Choice(index) => match options.get(index) {
            Some((_, value)) => Ok(Some(value.clone())),
            None => Err(SetupError::Configuration(format!(
                "front-end chose option {index} out of {}",
                options.len()
            ))),
        },
    }
}

fn select_resolution(
    frontend: &dyn Frontend,
    display_name: &str,
    available: &[Resolution],
) -> Result<Option<Resolution>, SetupError> {
    let options: Vec<(String, Resolution)> = available
        .iter()
        .map(|r| (r.to_string(), *r))
        .collect();
    ask_option(
        frontend,
        &format!("Select resolution for {display_name}"),
        &options,
    )
}

/// Runs the dialogue for a situation with an external display attached.
///
/// Returns the chosen setup, or `None` when the user cancelled anywhere.
pub fn choose_setup(
    frontend: &dyn Frontend,
    situation: &ScreenSituation,
) -> Result<Option<ScreenSetup>, SetupError> {
    if let Some(previous) = &situation.previous_setup {
        let prompt = format!(
            "This display is known. The last setup for it was like this:\n{previous}.\nApply the last used configuration?"
        );
        let options = [
            ("Apply last setup".to_string(), true),
            ("Enter different setup".to_string(), false),
        ];
        match ask_option(frontend, &prompt, &options)? {
            None => return Ok(None),
            Some(true) => return Ok(Some(previous.clone())),
            Some(false) => {}
        }
    }

    let modes: Vec<(String, OperationMode)> = [
        OperationMode::InternalOnly,
        OperationMode::ExternalOnly,
        OperationMode::UseBoth,
    ]
    .into_iter()
    .map(|mode| (mode.text().to_string(), mode))
    .collect();
    let Some(mode) = ask_option(frontend, "Display setup", &modes)? else {
        return Ok(None);
    };

    match mode {
        OperationMode::InternalOnly => {
            let available = ranked_resolutions(situation.internal());
            let Some(resolution) = select_resolution(frontend, "the internal screen", &available)?
            else {
                return Ok(None);
            };
            Ok(Some(ScreenSetup::new(Some(resolution), None, None, false)))
        }
        OperationMode::ExternalOnly => {
            let external = situation.external().ok_or_else(|| {
                SetupError::Configuration("no external display attached".into())
            })?;
            let available = ranked_resolutions(external);
            let Some(resolution) = select_resolution(frontend, "the external screen", &available)?
            else {
                return Ok(None);
            };
            Ok(Some(ScreenSetup::new(None, Some(resolution), None, true)))
        }
        OperationMode::UseBoth => {
            let positions: Vec<(String, RelativePosition)> = RelativePosition::ALL
                .into_iter()
                .map(|p| (format!("{} internal screen", p.text()), p))
                .collect();
            let Some(position) =
                ask_option(frontend, "Position of external screen", &positions)?
            else {
                return Ok(None);
            };

            if position == RelativePosition::Mirror {
                // mirroring only works at a resolution both sides support
                let common = situation.common_resolutions()?;
                let Some(resolution) = select_resolution(frontend, "both screens", &common)? else {
                    return Ok(None);
                };
                return Ok(Some(ScreenSetup::new(
                    Some(resolution),
                    Some(resolution),
                    Some(position),
                    false,
                )));
            }

            let internal_available = ranked_resolutions(situation.internal());
            let Some(internal) =
                select_resolution(frontend, "the internal screen", &internal_available)?
            else {
                return Ok(None);
            };
            let external = situation.external().ok_or_else(|| {
                SetupError::Configuration("no external display attached".into())
            })?;
            let external_available = ranked_resolutions(external);
            let Some(external) =
                select_resolution(frontend, "the external screen", &external_available)?
            else {
                return Ok(None);
            };
            let primary_options = [
                ("Internal screen is primary".to_string(), false),
                ("External screen is primary".to_string(), true),
            ];
            let Some(external_is_primary) =
                ask_option(frontend, "Select primary screen", &primary_options)?
            else {
                return Ok(None);
            };
            Ok(Some(ScreenSetup::new(
                Some(internal),
                Some(external),
                Some(position),
                external_is_primary,
            )))
        }
    }
}
