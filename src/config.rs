//! Application-level configuration loading, including the roster of boards.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "THEATRE_BINGO_CONFIG_PATH";
/// Boards shipped with the binary.
const DEFAULT_BOARDS: [&str; 6] = [
    "Annenberg",
    "ARCO",
    "Festival",
    "D'Place",
    "Camelot",
    "High School",
];

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    boards: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the built-in board roster.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        count = app_config.boards.len(),
                        "loaded board roster from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Build a configuration from an explicit roster. Blank and duplicate names are dropped and
    /// an empty roster falls back to the defaults.
    pub fn with_boards<I, S>(boards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster: Vec<String> = Vec::new();
        for name in boards {
            let name = name.into().trim().to_owned();
            if !name.is_empty() && !roster.contains(&name) {
                roster.push(name);
            }
        }

        if roster.is_empty() {
            warn!("board roster is empty; using built-in defaults");
            return Self::default();
        }
        Self { boards: roster }
    }

    /// Board names in display order.
    pub fn boards(&self) -> &[String] {
        &self.boards
    }

    /// Canonical name of `board` when it belongs to the roster.
    pub fn resolve_board(&self, board: &str) -> Option<&str> {
        let board = board.trim();
        self.boards
            .iter()
            .find(|name| name.as_str() == board)
            .map(String::as_str)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            boards: DEFAULT_BOARDS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    boards: Vec<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self::with_boards(value.boards)
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
