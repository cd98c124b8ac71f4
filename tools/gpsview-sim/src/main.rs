//! Desktop simulator for the gpsview location screen.
//!
//! Replays a JSON scenario against in-memory platform fakes and prints every
//! view update the screen makes.

mod console;
mod scenario;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gpsview_location::{LocationBackend, Provider};
use gpsview_permission::{GrantResult, REQUEST_CODE_LOCATION_PERMISSION};
use gpsview_presenter::{InlineUiThread, LocationScreen, QueuedUiThread, UiThread};
use gpsview_testing::{FakeLocationBackend, FakePermissionHost};
use log::debug;
use owo_colors::OwoColorize;

use crate::console::ConsoleView;
use crate::scenario::{Scenario, Step};

#[derive(Parser)]
#[command(name = "gpsview-sim")]
#[command(about = "Replay location scenarios against the gpsview screen", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print the view updates
    Run {
        /// Path to the scenario JSON
        scenario: PathBuf,
        /// Queue view updates and drain them after each step, like a UI loop
        #[arg(long)]
        queued: bool,
    },
    /// Validate a scenario without running it
    Check {
        /// Path to the scenario JSON
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Run { scenario, queued } => run(&scenario, queued),
        Commands::Check { scenario } => check(&scenario),
    }
}

fn check(path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)?;
    println!(
        "{} {} ({} steps)",
        "✅".green(),
        scenario.name.as_deref().unwrap_or("scenario"),
        scenario.steps.len()
    );
    Ok(())
}

fn run(path: &Path, queued: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    println!(
        "{} {}",
        "▶ Running".green().bold(),
        scenario
            .name
            .as_deref()
            .unwrap_or_else(|| path.to_str().unwrap_or("scenario"))
    );

    let (host, backend) = scenario.platform();
    let host = Arc::new(host);
    let backend = Arc::new(backend);
    let view = Arc::new(ConsoleView::default());
    let queue = queued.then(|| Arc::new(QueuedUiThread::new()));
    let ui: Arc<dyn UiThread> = match &queue {
        Some(queue) => queue.clone() as Arc<dyn UiThread>,
        None => Arc::new(InlineUiThread),
    };

    let mut screen = LocationScreen::new(
        scenario.permission_gate(host.clone()),
        Some(backend.clone() as Arc<dyn LocationBackend>),
        view.clone(),
        ui,
    );
    if let Some(parameters) = scenario.update_parameters {
        screen.session_mut().set_update_parameters(parameters)?;
    }

    for (index, step) in scenario.steps.iter().enumerate() {
        println!("{} {step:?}", format!("[{index}]").bold());
        apply(&mut screen, &host, &backend, step);
        if let Some(queue) = &queue {
            let ran = queue.drain();
            debug!("drained {ran} UI tasks");
        }
    }

    println!("{}", "■ Final screen".green().bold());
    print!("{}", view.snapshot());
    println!("  session: {:?}", screen.session().state());
    Ok(())
}

fn apply(
    screen: &mut LocationScreen,
    host: &FakePermissionHost,
    backend: &FakeLocationBackend,
    step: &Step,
) {
    match step {
        Step::Create => screen.on_create(),
        Step::StartClicked => screen.on_start_clicked(),
        Step::StopClicked => screen.on_stop_clicked(),
        Step::Destroy => screen.on_destroy(),
        Step::PermissionResult { granted } => {
            let result = if *granted {
                host.grant_all();
                GrantResult::Granted
            } else {
                host.revoke_all();
                GrantResult::Denied
            };
            screen.on_permission_result(REQUEST_CODE_LOCATION_PERMISSION, &[result, result]);
        }
        Step::ActivityResult { request_code } => screen.on_activity_result(*request_code),
        Step::ConfirmDialog { dialog } => screen.on_dialog_confirmed((*dialog).into()),
        Step::SetProvider { provider, enabled } => {
            backend.set_provider_enabled(*provider, *enabled);
            if *provider == Provider::Gps {
                host.set_gps_enabled(*enabled);
            }
        }
        Step::Event { event } => {
            if backend.emit(event) == 0 {
                println!("    {}", "no listener registered".dimmed());
            }
        }
        Step::CurrentLocation => match screen.session().current_location() {
            Ok(Some(fix)) => println!(
                "    {} {:.6}, {:.6}",
                "cached".cyan(),
                fix.latitude,
                fix.longitude
            ),
            Ok(None) => println!("    {}", "no cached fix".dimmed()),
            Err(err) => println!("    {} {err}", "error".red()),
        },
        Step::SetUpdateParameters { parameters } => {
            if let Err(err) = screen.session_mut().set_update_parameters(*parameters) {
                println!("    {} {err}", "error".red());
            }
        }
    }
}
