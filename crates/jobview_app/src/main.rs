mod config;
mod logging;
mod replay;

use std::path::PathBuf;

use clap::Parser;
use jobview_logging::jobview_error;
use log::LevelFilter;

use crate::config::AppConfig;

/// Replays a script of job view calls and prints each job's status line.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// RON config with jobs root, home directory and places.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log verbosity.
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// RON script: a list of `Create`, `Legacy`, `Call` and `Dismiss` steps.
    script: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };
    logging::initialize(config.log, args.log_level);

    let steps = match config::load_script(&args.script) {
        Ok(steps) => steps,
        Err(err) => {
            jobview_error!("{}", err);
            return Err(err.into());
        }
    };

    let (lines, history) = replay::run(&config, steps);
    for line in lines {
        println!("{line}");
    }
    println!("{} job(s) finished", history.finished.len());
    Ok(())
}
