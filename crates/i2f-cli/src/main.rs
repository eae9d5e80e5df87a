use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use i2f_io::convert::{ConvertSummary, convert};
use i2f_io::{Result, config};

/// Convert an Abaqus `.inp` mesh into a FEAP input deck, driven by a JSON
/// configuration file.
#[derive(Parser)]
#[command(name = "inp2feap", version, about)]
struct Args {
    /// Path to the JSON configuration file (prompted for when omitted)
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => match prompt_config_path() {
            Ok(path) => path,
            Err(err) => {
                error!("failed to read configuration path: {err}");
                return ExitCode::from(2);
            }
        },
    };

    match run(&config_path) {
        Ok(summary) => {
            info!(
                "wrote {} ({} nodes, {} elements)",
                summary.output.display(),
                summary.nodes,
                summary.elements
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(1)
        }
    }
}

fn run(config_path: &Path) -> Result<ConvertSummary> {
    let loaded = config::load(config_path)?;
    for warning in &loaded.warnings {
        warn!("{warning}");
    }
    convert(&loaded.config)
}

fn prompt_config_path() -> io::Result<PathBuf> {
    print!("Config file: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}
