use crate::comment::Comment;
use crate::error::{Result, SopError};
use crate::paths;
use crate::types::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// StageTransition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransition {
    pub stage: Stage,
    pub entered: DateTime<Utc>,
    pub exited: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A data-migration work item moving through the nine-stage lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub stage: Stage,
    pub stage_history: Vec<StageTransition>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub next_comment_seq: u32,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Object {
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.into(),
            title: title.into(),
            description: None,
            owner: None,
            stage: Stage::Scoping,
            stage_history: vec![StageTransition {
                stage: Stage::Scoping,
                entered: now,
                exited: None,
            }],
            comments: Vec::new(),
            next_comment_seq: 0,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn create(root: &Path, slug: impl Into<String>, title: impl Into<String>) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;

        let dir = paths::object_dir(root, &slug);
        if dir.exists() {
            return Err(SopError::ObjectExists(slug));
        }

        let object = Self::new(slug, title);
        object.save(root)?;
        Ok(object)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        let manifest = paths::object_manifest(root, slug);
        if !manifest.exists() {
            return Err(SopError::ObjectNotFound(slug.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let object: Object = serde_yaml::from_str(&data)?;
        Ok(object)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let manifest = paths::object_manifest(root, &self.slug);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&manifest, data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let objects_dir = root.join(paths::OBJECTS_DIR);
        if !objects_dir.exists() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::new();
        for entry in std::fs::read_dir(&objects_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let slug = entry.file_name().to_string_lossy().into_owned();
                match Self::load(root, &slug) {
                    Ok(o) => objects.push(o),
                    Err(SopError::ObjectNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        objects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(objects)
    }

    // ---------------------------------------------------------------------------
    // Stage transitions
    // ---------------------------------------------------------------------------

    pub fn can_advance_to(&self, target: Stage) -> Result<()> {
        if self.archived {
            return Err(SopError::InvalidTransition {
                from: self.stage.to_string(),
                to: target.to_string(),
                reason: "object is archived".to_string(),
            });
        }
        if target <= self.stage {
            return Err(SopError::InvalidTransition {
                from: self.stage.to_string(),
                to: target.to_string(),
                reason: "transitions are forward-only".to_string(),
            });
        }
        Ok(())
    }

    pub fn advance(&mut self, target: Stage) -> Result<()> {
        self.can_advance_to(target)?;

        let now = Utc::now();
        if let Some(last) = self.stage_history.last_mut() {
            last.exited = Some(now);
        }

        self.stage = target;
        self.updated_at = now;
        self.stage_history.push(StageTransition {
            stage: target,
            entered: now,
            exited: None,
        });

        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Derived metrics
    // ---------------------------------------------------------------------------

    /// Whole days the object has sat in its current stage as of `now`.
    pub fn aging_days(&self, now: DateTime<Utc>) -> i64 {
        let entered = self
            .stage_history
            .last()
            .map(|t| t.entered)
            .unwrap_or(self.created_at);
        (now - entered).num_days().max(0)
    }

    pub fn progress_percent(&self) -> u8 {
        self.stage.progress_percent()
    }

    // ---------------------------------------------------------------------------
    // Metadata mutations
    // ---------------------------------------------------------------------------

    pub fn update_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
        self.updated_at = Utc::now();
    }

    pub fn set_owner(&mut self, owner: impl Into<String>) {
        self.owner = Some(owner.into());
        self.updated_at = Utc::now();
    }

    pub fn set_archived(&mut self, archived: bool) {
        self.archived = archived;
        self.updated_at = Utc::now();
    }

    // ---------------------------------------------------------------------------
    // Comments
    // ---------------------------------------------------------------------------

    pub fn add_comment(&mut self, body: impl Into<String>, author: Option<String>) -> String {
        let id = crate::comment::add_comment(
            &mut self.comments,
            &mut self.next_comment_seq,
            body,
            author,
        );
        self.updated_at = Utc::now();
        id
    }

    pub fn resolve_comment(&mut self, id: &str) -> bool {
        let removed = crate::comment::resolve_comment(&mut self.comments, id);
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn object_create_load() {
        let dir = TempDir::new().unwrap();
        let object = Object::create(dir.path(), "customer-master", "Customer Master").unwrap();
        assert_eq!(object.slug, "customer-master");
        assert_eq!(object.stage, Stage::Scoping);

        let loaded = Object::load(dir.path(), "customer-master").unwrap();
        assert_eq!(loaded.title, "Customer Master");
        assert_eq!(loaded.stage_history.len(), 1);
    }

    #[test]
    fn object_create_duplicate_fails() {
        let dir = TempDir::new().unwrap();
        Object::create(dir.path(), "gl-accounts", "GL Accounts").unwrap();
        assert!(Object::create(dir.path(), "gl-accounts", "Again").is_err());
    }

    #[test]
    fn object_invalid_slug_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(Object::create(dir.path(), "Bad Slug", "x").is_err());
    }

    #[test]
    fn advance_records_history() {
        let dir = TempDir::new().unwrap();
        let mut object = Object::create(dir.path(), "vendors", "Vendors").unwrap();

        object.advance(Stage::Mapping).unwrap();
        assert_eq!(object.stage, Stage::Mapping);
        assert_eq!(object.stage_history.len(), 2);
        assert!(object.stage_history[0].exited.is_some());
        assert!(object.stage_history[1].exited.is_none());
    }

    #[test]
    fn advance_is_forward_only() {
        let dir = TempDir::new().unwrap();
        let mut object = Object::create(dir.path(), "vendors", "Vendors").unwrap();
        object.advance(Stage::Extraction).unwrap();

        assert!(object.advance(Stage::Mapping).is_err());
        assert!(object.advance(Stage::Extraction).is_err());
    }

    #[test]
    fn advance_archived_fails() {
        let dir = TempDir::new().unwrap();
        let mut object = Object::create(dir.path(), "vendors", "Vendors").unwrap();
        object.set_archived(true);
        assert!(object.advance(Stage::Mapping).is_err());
    }

    #[test]
    fn skipping_stages_is_allowed_forward() {
        let dir = TempDir::new().unwrap();
        let mut object = Object::create(dir.path(), "vendors", "Vendors").unwrap();
        object.advance(Stage::Uat).unwrap();
        assert_eq!(object.stage, Stage::Uat);
    }

    #[test]
    fn aging_days_counts_from_stage_entry() {
        let mut object = Object::new("test", "Test");
        let entered = Utc::now() - Duration::days(5);
        object.stage_history[0].entered = entered;

        assert_eq!(object.aging_days(Utc::now()), 5);
    }

    #[test]
    fn aging_days_resets_on_advance() {
        let dir = TempDir::new().unwrap();
        let mut object = Object::create(dir.path(), "test", "Test").unwrap();
        object.stage_history[0].entered = Utc::now() - Duration::days(10);
        object.advance(Stage::Mapping).unwrap();

        assert_eq!(object.aging_days(Utc::now()), 0);
    }

    #[test]
    fn list_sorted_by_creation() {
        let dir = TempDir::new().unwrap();
        let mut a = Object::create(dir.path(), "alpha", "Alpha").unwrap();
        let mut b = Object::create(dir.path(), "beta", "Beta").unwrap();
        a.created_at = Utc::now() - Duration::days(2);
        b.created_at = Utc::now() - Duration::days(1);
        a.save(dir.path()).unwrap();
        b.save(dir.path()).unwrap();

        let list = Object::list(dir.path()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].slug, "alpha");
        assert_eq!(list[1].slug, "beta");
    }

    #[test]
    fn comments_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut object = Object::create(dir.path(), "test", "Test").unwrap();
        let id = object.add_comment("mapping sheet is stale", Some("priya".into()));
        object.save(dir.path()).unwrap();

        let loaded = Object::load(dir.path(), "test").unwrap();
        assert_eq!(loaded.comments.len(), 1);
        assert_eq!(loaded.comments[0].id, id);
        assert_eq!(loaded.comments[0].author.as_deref(), Some("priya"));
    }
}
