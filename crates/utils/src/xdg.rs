use std::env;
use std::path::PathBuf;

use voketag_core::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, SESSION_FILE_NAME};

/// XDG Base Directory paths for voketag
pub struct XdgPaths;

impl XdgPaths {
    /// Get XDG_CONFIG_HOME/voketag or fallback
    pub fn config_dir() -> PathBuf {
        env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".config"))
                    .unwrap_or_else(|| PathBuf::from(".config"))
            })
            .join(CONFIG_DIR_NAME)
    }

    /// Get XDG_STATE_HOME/voketag or fallback
    pub fn state_dir() -> PathBuf {
        env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".local/state"))
                    .unwrap_or_else(|| PathBuf::from(".local/state"))
            })
            .join(CONFIG_DIR_NAME)
    }

    /// Default location of the JSON config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE_NAME)
    }

    /// Default location of the persisted session (tokens and CSRF cache)
    pub fn session_file() -> PathBuf {
        Self::state_dir().join(SESSION_FILE_NAME)
    }
}
