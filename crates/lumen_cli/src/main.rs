//! Lumen CLI
//!
//! Validate motion configuration and run headless motion simulations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lumen_animation::{FrameScheduler, MotionRuntime, RevealState};
use lumen_carousel::{SlideChange, Slider, SliderConfig};
use lumen_core::{MotionConfig, MotionPreference, SharedTarget};
use lumen_platform::{FocusEvent, InputEvent, IntersectionEvent, KeyboardEvent, PointerEvent};

mod script;

use script::Step;

/// Simulated frame length (60 Hz)
const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Parser)]
#[command(name = "lumen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lumen motion toolkit CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Motion config file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Force reduced motion (otherwise read from LUMEN_REDUCED_MOTION)
    #[arg(long, global = true)]
    reduced_motion: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a motion config and print the resolved values
    Check {
        /// Config file to validate
        path: PathBuf,
    },

    /// Run a scripted slider session and print its state after each step
    Simulate {
        /// Number of slides
        #[arg(short, long, default_value = "4")]
        slides: usize,

        /// Steps separated by ';' (next, prev, goto N, wait MS, drag DX,
        /// hover, leave, focus, blur, pause, resume, key left|right|up|down)
        #[arg(long)]
        script: String,
    },

    /// Simulate a staggered reveal and print target opacity per frame
    Reveal {
        /// Number of targets in the container
        #[arg(short, long, default_value = "3")]
        targets: usize,

        /// Print every Nth frame
        #[arg(long, default_value = "4")]
        every: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let preference = if cli.reduced_motion {
        MotionPreference::reduced()
    } else {
        MotionPreference::from_env()
    };

    match cli.command {
        Commands::Check { path } => cmd_check(&path),
        Commands::Simulate { slides, script } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_simulate(&config, preference, slides, &script)
        }
        Commands::Reveal { targets, every } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_reveal(config, preference, targets, every)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<MotionConfig> {
    match path {
        Some(path) => MotionConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(MotionConfig::default()),
    }
}

fn cmd_check(path: &Path) -> Result<()> {
    let config = MotionConfig::load(path)
        .with_context(|| format!("Invalid motion config {}", path.display()))?;

    info!("{} is valid", path.display());
    let resolved = toml::to_string_pretty(&config).context("Failed to render config")?;
    println!("{}", resolved);

    Ok(())
}

fn cmd_simulate(
    config: &MotionConfig,
    preference: MotionPreference,
    slides: usize,
    script: &str,
) -> Result<()> {
    let steps = script::parse(script).context("Invalid simulation script")?;

    let scheduler = FrameScheduler::new();
    let slider = Slider::mount(
        &scheduler.handle(),
        slides,
        SliderConfig::from(&config.slider),
        preference,
    );

    info!("Simulating {} slide(s), {} step(s)", slides, steps.len());
    println!("{:>10}  {}", "start", slider.snapshot());

    for step in steps {
        let outcome = match &step {
            Step::Next => describe(slider.go_next()),
            Step::Prev => describe(slider.go_prev()),
            Step::GoTo(index) => describe(slider.go_to(*index)),
            Step::Wait(ms) => {
                scheduler.advance_by(Duration::from_millis(*ms), FRAME);
                let changes = slider.take_autoplay_changes();
                if changes.is_empty() {
                    String::new()
                } else {
                    changes
                        .into_iter()
                        .map(|change| describe(Some(change)))
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            }
            Step::Drag(dx) => {
                slider.handle_input(&InputEvent::Pointer(PointerEvent::Pressed {
                    x: 0.0,
                    y: 0.0,
                }));
                describe(slider.handle_input(&InputEvent::Pointer(PointerEvent::Released {
                    x: *dx,
                    y: 0.0,
                })))
            }
            Step::Hover => {
                slider.handle_input(&InputEvent::Pointer(PointerEvent::Entered));
                String::new()
            }
            Step::Leave => {
                slider.handle_input(&InputEvent::Pointer(PointerEvent::Left));
                String::new()
            }
            Step::Focus => {
                slider.handle_input(&InputEvent::Focus(FocusEvent::Entered));
                String::new()
            }
            Step::Blur => {
                slider.handle_input(&InputEvent::Focus(FocusEvent::Left));
                String::new()
            }
            Step::Pause => {
                slider.pause();
                String::new()
            }
            Step::Resume => {
                slider.resume();
                String::new()
            }
            Step::Key(key) => describe(slider.handle_input(&InputEvent::Keyboard(
                KeyboardEvent::pressed(key.clone()),
            ))),
        };

        let label = format!("{:?}", step).to_ascii_lowercase();
        if outcome.is_empty() {
            println!("{:>10}  {}", label, slider.snapshot());
        } else {
            println!("{:>10}  {}  <- {}", label, slider.snapshot(), outcome);
        }
    }

    Ok(())
}

fn describe(change: Option<SlideChange>) -> String {
    match change {
        Some(change) => format!(
            "{:?}: {} -> {} ({})",
            change.source, change.previous, change.index, change.direction
        )
        .to_ascii_lowercase(),
        None => "dropped".to_string(),
    }
}

fn cmd_reveal(
    config: MotionConfig,
    preference: MotionPreference,
    targets: usize,
    every: u64,
) -> Result<()> {
    let runtime = MotionRuntime::new(config, preference);
    let shared: Vec<SharedTarget> = (0..targets).map(|_| SharedTarget::new()).collect();

    let registration = runtime.reveal().register(
        1,
        shared.iter().map(SharedTarget::boxed).collect(),
        runtime.reveal_options(),
    );
    if !registration.is_registered() {
        info!("Nothing to reveal");
        return Ok(());
    }

    runtime.dispatch(IntersectionEvent::new(1, 1.0));
    print_frame(&runtime, &shared);

    let every = every.max(1);
    while runtime.advance(FRAME) {
        if runtime.scheduler().frame_count() % every == 0 {
            print_frame(&runtime, &shared);
        }
    }
    print_frame(&runtime, &shared);

    let settled = runtime
        .reveal()
        .states(1)
        .map(|states| states.iter().all(|s| *s == RevealState::Settled))
        .unwrap_or(false);
    info!(
        "Reveal finished after {} frame(s) ({:?}), settled: {}",
        runtime.scheduler().frame_count(),
        runtime.scheduler().now(),
        settled
    );

    Ok(())
}

fn print_frame(runtime: &MotionRuntime, targets: &[SharedTarget]) {
    let row: Vec<String> = targets
        .iter()
        .map(|t| format!("{:.2}@{:>5.1}", t.opacity(), t.transform().translate_y))
        .collect();
    println!(
        "{:>7.1}ms  {}",
        runtime.scheduler().now().as_secs_f64() * 1000.0,
        row.join("  ")
    );
}
