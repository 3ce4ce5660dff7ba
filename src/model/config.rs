use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from `config.toml` inside the tasks directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Ordered column names. The first one is the status of new tasks.
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            columns: default_columns(),
        }
    }
}

fn default_columns() -> Vec<String> {
    vec!["TODO".to_string(), "DOING".to_string(), "DONE".to_string()]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Hex color overrides keyed by theme slot (e.g. `highlight = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Config {
    /// Status given to newly created tasks
    pub fn default_status(&self) -> Option<&str> {
        self.board.columns.first().map(|s| s.as_str())
    }

    /// Whether `status` names one of the configured columns
    pub fn is_known_status(&self, status: &str) -> bool {
        self.board.columns.iter().any(|c| c == status)
    }
}
