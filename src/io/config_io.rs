use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::model::config::Config;

/// Default name of the tasks directory
pub const TASKS_DIR: &str = ".tasks";
/// Config file name inside the tasks directory
pub const CONFIG_FILE: &str = "config.toml";

const CONFIG_TEMPLATE: &str = r##"[board]
# Column order on the board. New tasks start in the first column.
columns = ["TODO", "DOING", "DONE"]

# --- UI Customization ---
# Uncomment and edit to override the default colors.
#
# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#7D78BF"
# red = "#FF4444"
# yellow = "#FFD700"
# green = "#44FF88"
# selection_bg = "#3D1438"
# border = "#5A5580"
"##;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no columns configured in [board]")]
    NoColumns,
    #[error("column \"{0}\" is configured more than once")]
    DuplicateColumn(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn config_path(tasks_dir: &Path) -> PathBuf {
    tasks_dir.join(CONFIG_FILE)
}

/// Find the tasks directory by walking up from `start`, looking for
/// `.tasks/config.toml`.
pub fn discover_tasks_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let tasks_dir = current.join(TASKS_DIR);
        if tasks_dir.is_dir() && config_path(&tasks_dir).exists() {
            return Some(tasks_dir);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Ensure the tasks directory and a default config exist.
/// Returns true if a new config file was written. Never overwrites.
pub fn initialize(tasks_dir: &Path) -> Result<bool, ConfigError> {
    fs::create_dir_all(tasks_dir)?;
    let path = config_path(tasks_dir);
    if path.exists() {
        debug!("config already present at {}", path.display());
        return Ok(false);
    }
    fs::write(&path, CONFIG_TEMPLATE)?;
    info!("created default config at {}", path.display());
    Ok(true)
}

/// Read, parse and validate the config
pub fn load_config(tasks_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(tasks_dir);
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
        path: path.clone(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text)?;
    validate(&config)?;
    debug!("loaded columns {:?}", config.board.columns);
    Ok(config)
}

/// Columns must be non-empty and unique
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.board.columns.is_empty() {
        return Err(ConfigError::NoColumns);
    }
    let mut seen = HashSet::new();
    for column in &config.board.columns {
        if !seen.insert(column.as_str()) {
            return Err(ConfigError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}
