use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application path resolution.
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "easel").map(|pd| pd.config_dir().join("config.json"))
    }

    /// CSV session log, the local stand-in for the webhook backends.
    pub fn session_log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("easel");
            Some(state_dir.join("sessions.csv"))
        } else {
            ProjectDirs::from("", "", "easel")
                .map(|pd| pd.data_local_dir().join("sessions.csv"))
        }
    }

    /// Tracing output; a TUI cannot log to stdout.
    pub fn log_file_path() -> Option<PathBuf> {
        Self::session_log_path().map(|p| p.with_file_name("easel.log"))
    }
}
