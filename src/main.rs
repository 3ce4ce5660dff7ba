use std::fs::File;
use std::path::Path;

use clap::Parser;
use doings::cli::commands::Cli;
use doings::cli::handlers;
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

fn main() {
    let cli = Cli::parse();

    if let Some(path) = cli.log.as_deref()
        && let Err(e) = init_logging(path)
    {
        eprintln!("error: cannot open log file {}: {}", path.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// The TUI owns the terminal, so logs only ever go to a file
fn init_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    WriteLogger::init(LevelFilter::Debug, config, file)?;
    Ok(())
}
