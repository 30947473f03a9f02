use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::text::{EnglishMessages, MessageFormatter};

pub const DEFAULT_JOBS_ROOT: &str = "/org/kde/notificationmanager/jobs";

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Process-wide settings shared by every job of a registry.
#[derive(Clone)]
pub struct JobContext {
    /// Prefix of every job's remote address.
    pub jobs_root: String,
    /// Home directory abbreviated to `~` in destinations.
    pub home_dir: Option<PathBuf>,
    pub messages: Arc<dyn MessageFormatter>,
    pub clock: Clock,
}

impl JobContext {
    pub fn address_for(&self, id: crate::JobId) -> String {
        format!("{}/JobView_{id}", self.jobs_root.trim_end_matches('/'))
    }
}

impl Default for JobContext {
    fn default() -> Self {
        Self {
            jobs_root: DEFAULT_JOBS_ROOT.to_string(),
            home_dir: dirs::home_dir(),
            messages: Arc::new(EnglishMessages),
            clock: Arc::new(Utc::now),
        }
    }
}

impl fmt::Debug for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobContext")
            .field("jobs_root", &self.jobs_root)
            .field("home_dir", &self.home_dir)
            .finish_non_exhaustive()
    }
}
