#![forbid(unsafe_code)]

mod command;
mod config;
mod constants;
mod dialogue;
mod error;
mod frontend;
mod probe;
mod store;
mod topology;
mod types;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;

use config::ConnectorConfig;
use error::SetupError;
use frontend::{Frontend, FrontendChoice};
use store::PreferenceStore;
use topology::{ScreenSituation, ranked_resolutions};
use types::ScreenSetup;

/// Configure the laptop panel and an external display.
#[derive(Parser, Debug)]
#[command(name = "screendock", version, about)]
struct Args {
    /// Presentation front-end for questions
    #[arg(long, value_enum, default_value_t = FrontendChoice::Auto)]
    frontend: FrontendChoice,

    /// Use only the internal display at its best resolution, without asking
    #[arg(long, conflicts_with = "external_only")]
    internal_only: bool,

    /// Use only the external display at its best resolution, without asking
    #[arg(long)]
    external_only: bool,

    /// Print the reconfiguration call instead of executing it
    #[arg(long)]
    dry_run: bool,

    /// Alternate config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let frontend = frontend::resolve(args.frontend)?;

    match run(&args, frontend.as_ref()) {
        Ok(()) => Ok(()),
        Err(e) => {
            frontend.report_error(&format!("{e:#}"));
            Err(e)
        }
    }
}

fn run(args: &Args, frontend: &dyn Frontend) -> Result<()> {
    let config = ConnectorConfig::load(args.config.as_deref())?;

    let connectors = probe::run().context("probing display topology failed")?;
    let mut situation = ScreenSituation::classify(
        connectors,
        &config.internal_candidates,
        config.external_candidates.as_deref(),
    )?;
    info!(connector = %situation.internal().name, "detected internal connector");
    match situation.external() {
        Some(external) => info!(connector = %external.name, "detected external connector"),
        None => info!("no external display attached"),
    }

    let store = PreferenceStore::open(&store_path()).context("opening preference store failed")?;
    let edid = situation.external().and_then(|c| c.edid_bytes());
    if let Some(edid) = &edid {
        let previous = store.get(edid)?;
        if let Some(previous) = &previous {
            info!(setup = %previous, "known display, found remembered setup");
        }
        situation.attach_previous_setup(previous);
    }

    let Some(setup) = choose_setup(args, frontend, &situation)? else {
        info!("cancelled, leaving display configuration unchanged");
        return Ok(());
    };
    info!(setup = %setup, "chosen setup");

    let commands = command::synthesize(&setup, &situation)?;
    if args.dry_run {
        println!("{}", command::to_argv(&commands).join(" "));
        return Ok(());
    }
    command::apply(&commands).context("reconfiguration failed")?;

    if let Some(edid) = &edid {
        store.put(edid, &setup)?;
    }
    store.commit().context("saving preferences failed")?;
    Ok(())
}

/// Picks the setup: a command-line shortcut when one was given, the
/// interactive dialogue when an external display is attached, and the
/// internal panel at its best resolution otherwise.
fn choose_setup(
    args: &Args,
    frontend: &dyn Frontend,
    situation: &ScreenSituation,
) -> Result<Option<ScreenSetup>, SetupError> {
    if args.internal_only {
        return Ok(Some(internal_only_setup(situation)));
    }
    if args.external_only {
        let external = situation.external().ok_or_else(|| {
            SetupError::Configuration("--external-only given, but no external display attached".into())
        })?;
        let resolution = ranked_resolutions(external)[0];
        return Ok(Some(ScreenSetup::new(None, Some(resolution), None, true)));
    }
    if situation.external().is_none() {
        // nothing to ask about without an external display
        return Ok(Some(internal_only_setup(situation)));
    }
    dialogue::choose_setup(frontend, situation)
}

fn internal_only_setup(situation: &ScreenSituation) -> ScreenSetup {
    let resolution = ranked_resolutions(situation.internal())[0];
    ScreenSetup::new(Some(resolution), None, None, false)
}

fn store_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(constants::files::APP_DIR);
    path.push(constants::files::STORE_FILENAME);
    path
}
