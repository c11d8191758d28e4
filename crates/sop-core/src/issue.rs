use crate::comment::Comment;
use crate::error::{Result, SopError};
use crate::paths;
use crate::types::{IssueSeverity, IssueStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

/// A problem or action item attached to a migration object.
///
/// Issues are stored top-level (not embedded in the object manifest) because
/// the external REST facade lists and mutates them across objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub object_slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Meeting this issue was raised in, if it came from an action item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meeting: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub next_comment_seq: u32,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn new(object_slug: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            object_slug: object_slug.into(),
            title: title.into(),
            description: None,
            severity: IssueSeverity::Medium,
            status: IssueStatus::Open,
            owner: None,
            source_meeting: None,
            comments: Vec::new(),
            next_comment_seq: 0,
            archived: false,
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Create an issue against an existing object and persist it.
    pub fn create(
        root: &Path,
        object_slug: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self> {
        let object_slug = object_slug.into();
        if !paths::object_manifest(root, &object_slug).exists() {
            return Err(SopError::ObjectNotFound(object_slug));
        }
        let issue = Self::new(object_slug, title);
        issue.save(root)?;
        Ok(issue)
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let manifest = paths::issue_manifest(root, id);
        if !manifest.exists() {
            return Err(SopError::IssueNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let issue: Issue = serde_yaml::from_str(&data)?;
        Ok(issue)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let manifest = paths::issue_manifest(root, &self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&manifest, data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let issues_dir = root.join(paths::ISSUES_DIR);
        if !issues_dir.exists() {
            return Ok(Vec::new());
        }

        let mut issues = Vec::new();
        for entry in std::fs::read_dir(&issues_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let id = entry.file_name().to_string_lossy().into_owned();
                match Self::load(root, &id) {
                    Ok(i) => issues.push(i),
                    Err(SopError::IssueNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        issues.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(issues)
    }

    pub fn list_for_object(root: &Path, object_slug: &str) -> Result<Vec<Self>> {
        let mut issues = Self::list(root)?;
        issues.retain(|i| i.object_slug == object_slug);
        Ok(issues)
    }

    /// Issues visible to `owner` — the per-user row filter backing the facade.
    pub fn list_for_owner(root: &Path, owner: &str) -> Result<Vec<Self>> {
        let mut issues = Self::list(root)?;
        issues.retain(|i| i.owner.as_deref() == Some(owner));
        Ok(issues)
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn close(&mut self) {
        self.status = IssueStatus::Closed;
        let now = Utc::now();
        self.closed_at = Some(now);
        self.updated_at = now;
    }

    pub fn set_status(&mut self, status: IssueStatus) {
        if status == IssueStatus::Closed {
            self.close();
            return;
        }
        self.status = status;
        self.closed_at = None;
        self.updated_at = Utc::now();
    }

    pub fn set_archived(&mut self, archived: bool) {
        self.archived = archived;
        self.updated_at = Utc::now();
    }

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

    // ---------------------------------------------------------------------------
    // Derived metrics
    // ---------------------------------------------------------------------------

    /// Whole days since the issue was opened. Closed issues stop aging.
    pub fn aging_days(&self, now: DateTime<Utc>) -> i64 {
        let until = self.closed_at.unwrap_or(now);
        (until - self.created_at).num_days().max(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
