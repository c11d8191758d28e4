use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-user pinned objects, persisted at `.sop/pins.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pins {
    #[serde(default)]
    pub by_user: BTreeMap<String, Vec<String>>,
}

impl Pins {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::pins_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let pins: Pins = serde_yaml::from_str(&data)?;
        Ok(pins)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::pins_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Idempotent: pinning an already-pinned object is a no-op.
    pub fn pin(&mut self, user: &str, slug: &str) {
        let list = self.by_user.entry(user.to_string()).or_default();
        if !list.contains(&slug.to_string()) {
            list.push(slug.to_string());
        }
    }

    /// Tolerant of absence: unpinning something never pinned is a no-op.
    pub fn unpin(&mut self, user: &str, slug: &str) {
        if let Some(list) = self.by_user.get_mut(user) {
            list.retain(|s| s != slug);
            if list.is_empty() {
                self.by_user.remove(user);
            }
        }
    }

    pub fn for_user(&self, user: &str) -> &[String] {
        self.by_user.get(user).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn pin_unpin_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut pins = Pins::load(dir.path()).unwrap();
        pins.pin("alice", "customer-master");
        pins.pin("alice", "customer-master"); // idempotent
        pins.pin("alice", "vendors");
        pins.save(dir.path()).unwrap();

        let loaded = Pins::load(dir.path()).unwrap();
        assert_eq!(loaded.for_user("alice"), ["customer-master", "vendors"]);
        assert!(loaded.for_user("bob").is_empty());
    }

    #[test]
    fn unpin_missing_is_noop() {
        let mut pins = Pins::default();
        pins.unpin("alice", "ghost");
        pins.pin("alice", "a");
        pins.unpin("alice", "a");
        assert!(pins.for_user("alice").is_empty());
    }
}
