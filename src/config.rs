use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::{DEFAULT_KIND, DEFAULT_SUBJECT};

/// Last-used session setup, persisted so flags may be omitted on the next
/// run. Times are hours, matching the CLI flags and the old setup links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub subject: String,
    pub kind: String,
    pub total_hours: f64,
    pub sketch_hours: Option<f64>,
    pub color_hours: Option<f64>,
    pub detail_hours: Option<f64>,
    pub organize_hours: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            kind: DEFAULT_KIND.to_string(),
            total_hours: 1.0,
            sketch_hours: None,
            color_hours: None,
            detail_hours: None,
            organize_hours: None,
        }
    }
}

impl Config {
    /// Per-step overrides in step order, converted to seconds for the
    /// allocation resolver.
    pub fn override_seconds(&self) -> Vec<Option<f64>> {
        [
            self.sketch_hours,
            self.color_hours,
            self.detail_hours,
            self.organize_hours,
        ]
        .iter()
        .map(|h| h.map(|h| h * 3600.0))
        .collect()
    }

    pub fn total_seconds(&self) -> i64 {
        (self.total_hours * 3600.0).floor() as i64
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(p) = crate::app_dirs::AppDirs::config_path() {
            p
        } else if let Some(pd) = ProjectDirs::from("", "", "easel") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("easel_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            subject: "인물 그리기".into(),
            kind: "발상과 표현".into(),
            total_hours: 2.5,
            sketch_hours: Some(0.5),
            color_hours: None,
            detail_hours: Some(1.0),
            organize_hours: None,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_degrades_to_default() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn override_seconds_in_step_order() {
        let cfg = Config {
            sketch_hours: Some(0.25),
            detail_hours: Some(1.0),
            ..Config::default()
        };
        assert_eq!(
            cfg.override_seconds(),
            vec![Some(900.0), None, Some(3600.0), None]
        );
        assert_eq!(cfg.total_seconds(), 3600);
    }
}
