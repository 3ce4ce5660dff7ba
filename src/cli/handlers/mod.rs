mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use log::info;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, TASKS_DIR};
use crate::io::store::TaskStore;
use crate::model::board::Board;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let start = start_dir(cli.dir.as_deref())?;
    match cli.command {
        Some(Commands::Init) => cmd_init(&start),
        Some(Commands::List(args)) => cmd_list(&resolve_tasks_dir(&start)?, args),
        Some(Commands::Add(args)) => cmd_add(&resolve_tasks_dir(&start)?, args),
        None => crate::tui::run(&resolve_tasks_dir(&start)?),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The `-C` directory if given (must exist), else the working directory
fn start_dir(dir: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir.display(), e))?),
        None => Ok(std::env::current_dir()?),
    }
}

/// Find the tasks directory above `start`, creating `start/.tasks` with a
/// default config if there is none.
pub fn resolve_tasks_dir(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(dir) = config_io::discover_tasks_dir(start) {
        return Ok(dir);
    }
    let dir = start.join(TASKS_DIR);
    if config_io::initialize(&dir)? {
        eprintln!("Initialized {}", dir.display());
    }
    Ok(dir)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_list(tasks_dir: &Path, args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(tasks_dir)?;
    let listing = TaskStore::new(tasks_dir).list()?;
    let warnings = listing.warnings(&config.board.columns);
    let board = Board::new(config.board.columns, listing.tasks);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&board_to_json(&board, warnings))?);
    } else {
        for line in format_board_listing(&board) {
            println!("{}", line);
        }
        for warning in &warnings {
            eprintln!("warning: {}", warning);
        }
    }
    Ok(())
}

fn cmd_add(tasks_dir: &Path, args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(tasks_dir)?;
    let status = config
        .default_status()
        .ok_or("no columns configured")?;
    let store = TaskStore::new(tasks_dir);
    let task = store.create(&args.title.join(" "), status)?;
    info!("added {} from the command line", task.id);
    println!("{}", task.id);
    Ok(())
}
