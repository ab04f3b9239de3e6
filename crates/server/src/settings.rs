//! The settings file: `cask_settings.json` in the directory named by
//! `--settings` (current directory when the flag is absent).

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Location and name of the db file.
    pub db_path: String,
    /// Port the server listens on.
    pub port: u16,
    /// "on" activates trace output at startup.
    pub trace: String,
    /// When not empty, log output goes to this file instead of stderr.
    pub log_path: String,
    /// Gzip responses for clients that accept it.
    pub compress_response: bool,
    /// Server-wide soft error budget, used when a request sets
    /// `errLimit = -1`.
    pub max_errs: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: "cask.db".into(),
            port: 8651,
            trace: String::new(),
            log_path: String::new(),
            compress_response: false,
            max_errs: 10,
        }
    }
}

pub const SETTINGS_FILE: &str = "cask_settings.json";

impl Settings {
    /// Read settings from `<dir>/cask_settings.json`.
    pub fn load(dir: &str) -> Result<Settings, String> {
        let path = Path::new(dir).join(SETTINGS_FILE);
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        serde_json::from_str(&raw).map_err(|e| format!("{}: {e}", path.display()))
    }
}
