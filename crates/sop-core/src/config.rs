use crate::error::{Result, SopError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_version() -> u32 {
    1
}

/// Project-level configuration stored at `.sop/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: String,
    /// Attendees pre-filled on new meetings.
    #[serde(default)]
    pub default_attendees: Vec<String>,
}

impl Config {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: project.into(),
            default_attendees: Vec::new(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(SopError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

/// Scaffold the `.sop/` workspace. Idempotent for directories; fails if a
/// config already exists.
pub fn init(root: &Path, project: &str) -> Result<Config> {
    crate::io::ensure_dir(&root.join(paths::OBJECTS_DIR))?;
    crate::io::ensure_dir(&root.join(paths::ISSUES_DIR))?;
    crate::io::ensure_dir(&root.join(paths::MEETINGS_DIR))?;
    crate::io::ensure_dir(&root.join(paths::RECURRING_DIR))?;

    let config = Config::new(project);
    let data = serde_yaml::to_string(&config)?;
    crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
