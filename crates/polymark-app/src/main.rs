//! Command-line entry point: replay an annotation script.

use clap::Parser;
use kurbo::Size;
use polymark_app::{ReplayOptions, ReplayResult, load_script, replay};
use polymark_core::EngineConfig;
use std::path::PathBuf;
use std::process::ExitCode;

/// Replay a scripted polygon annotation session and print the labels
#[derive(Parser, Debug)]
#[command(name = "polymark")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON script of host actions and pointer/key events
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Engine configuration file (JSON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Surface width in pixels
    #[arg(long, default_value_t = 1024.0)]
    width: f64,

    /// Surface height in pixels
    #[arg(long, default_value_t = 768.0)]
    height: f64,

    /// Viewport zoom applied to scene coordinates
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Print the report on a single line
    #[arg(long)]
    compact: bool,
}

fn run(args: &Args) -> ReplayResult<String> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let steps = load_script(&args.script)?;
    let options = ReplayOptions {
        size: Size::new(args.width, args.height),
        zoom: args.zoom,
        config,
    };
    replay(&steps, options)?.to_json(args.compact)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    log::info!("Replaying {}", args.script.display());

    match run(&args) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("polymark: {e}");
            ExitCode::FAILURE
        }
    }
}
