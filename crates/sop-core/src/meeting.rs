use crate::error::{Result, SopError};
use crate::issue::Issue;
use crate::paths;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Minutes
// ---------------------------------------------------------------------------

/// Structured minutes-of-meeting produced by the LLM function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minutes {
    pub tldr: String,
    #[serde(default)]
    pub discussion_points: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub action_log: String,
    #[serde(default)]
    pub quote: String,
    pub model_used: String,
}

// ---------------------------------------------------------------------------
// ActionItem
// ---------------------------------------------------------------------------

/// A follow-up captured during the meeting, convertible into an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub title: String,
    /// Object the resulting issue should attach to.
    pub object_slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

// ---------------------------------------------------------------------------
// Meeting
// ---------------------------------------------------------------------------

/// One held meeting: attendance, transcript, minutes, and the issues
/// created from its action items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub held_on: NaiveDate,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<Minutes>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub linked_issues: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    pub fn new(title: impl Into<String>, held_on: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            held_on,
            attendees: Vec::new(),
            transcript: None,
            minutes: None,
            action_items: Vec::new(),
            linked_issues: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn create(root: &Path, title: impl Into<String>, held_on: NaiveDate) -> Result<Self> {
        let meeting = Self::new(title, held_on);
        meeting.save(root)?;
        Ok(meeting)
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let manifest = paths::meeting_manifest(root, id);
        if !manifest.exists() {
            return Err(SopError::MeetingNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let meeting: Meeting = serde_yaml::from_str(&data)?;
        Ok(meeting)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let manifest = paths::meeting_manifest(root, &self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&manifest, data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::MEETINGS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut meetings = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let id = entry.file_name().to_string_lossy().into_owned();
                match Self::load(root, &id) {
                    Ok(m) => meetings.push(m),
                    Err(SopError::MeetingNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        meetings.sort_by(|a, b| a.held_on.cmp(&b.held_on));
        Ok(meetings)
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn set_transcript(&mut self, transcript: impl Into<String>) {
        self.transcript = Some(transcript.into());
        self.updated_at = Utc::now();
    }

    pub fn set_minutes(&mut self, minutes: Minutes) {
        self.minutes = Some(minutes);
        self.updated_at = Utc::now();
    }

    pub fn add_action_item(&mut self, item: ActionItem) {
        self.action_items.push(item);
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Action-item conversion
// ---------------------------------------------------------------------------

/// Create one issue per pending action item, linking each to the meeting
/// as soon as it is created.
///
/// The link is written back to the meeting manifest before the next issue is
/// created, so a failure midway leaves every already-created issue linked
/// rather than orphaned. Returns the ids of the issues created by this call.
pub fn link_action_items(root: &Path, meeting: &mut Meeting) -> Result<Vec<String>> {
    let pending: Vec<ActionItem> = meeting
        .action_items
        .iter()
        .skip(meeting.linked_issues.len())
        .cloned()
        .collect();

    let mut created = Vec::new();
    for item in pending {
        let mut issue = Issue::create(root, item.object_slug.clone(), item.title.clone())?;
        issue.owner = item.owner.clone();
        issue.source_meeting = Some(meeting.id.clone());
        issue.save(root)?;

        meeting.linked_issues.push(issue.id.clone());
        meeting.updated_at = Utc::now();
        meeting.save(root)?;

        created.push(issue.id);
    }
    Ok(created)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
