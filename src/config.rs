use crate::app_dirs::AppDirs;
use crate::sampler::DEFAULT_MAX_QUESTIONS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted defaults. CLI flags override them for a run and the effective
/// values are written back afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub max_questions: usize,
    pub time_limit_secs: Option<u32>,
    pub bank_path: Option<PathBuf>,
    pub student_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
            time_limit_secs: None,
            bank_path: None,
            student_id: "local".to_string(),
        }
    }
}

impl Config {
    /// A quiz needs at least one question and one second.
    pub fn is_usable(&self) -> bool {
        self.max_questions > 0 && self.time_limit_secs != Some(0)
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
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("drillq_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) if cfg.is_usable() => cfg,
                Ok(cfg) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        max_questions = cfg.max_questions,
                        time_limit_secs = ?cfg.time_limit_secs,
                        "ignoring config with zero limits"
                    );
                    Config::default()
                }
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
