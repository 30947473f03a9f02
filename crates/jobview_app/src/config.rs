use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jobview_core::{Call, JobContext, JobId, LegacyCall, Place, DEFAULT_JOBS_ROOT};
use jobview_logging::jobview_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogDestination;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Settings read from the RON config file. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub jobs_root: String,
    pub home_dir: Option<PathBuf>,
    pub places: Vec<Place>,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jobs_root: DEFAULT_JOBS_ROOT.to_string(),
            home_dir: dirs::home_dir(),
            places: Vec::new(),
            log: LogDestination::default(),
        }
    }
}

impl AppConfig {
    pub fn job_context(&self) -> JobContext {
        JobContext {
            jobs_root: self.jobs_root.clone(),
            home_dir: self.home_dir.clone(),
            ..JobContext::default()
        }
    }
}

/// One step of a replay script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Create(JobId),
    Legacy { job: JobId, call: LegacyCall },
    Call { job: JobId, call: Call },
    /// The user hides a job into history.
    Dismiss(JobId),
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = read_ron(path)?;
    jobview_info!("Loaded config from {:?}", path);
    Ok(config)
}

pub fn load_script(path: &Path) -> Result<Vec<Step>, ConfigError> {
    let steps: Vec<Step> = read_ron(path)?;
    jobview_info!("Loaded {} script steps from {:?}", steps.len(), path);
    Ok(steps)
}

fn read_ron<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
