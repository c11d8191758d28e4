use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note left on an object or an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Append a comment and return its auto-generated ID.
///
/// `seq` is a monotonic counter stored on the owning entity. Incrementing it
/// before generating the ID keeps IDs unique even after comments are resolved
/// (removed), which a length-based scheme would not.
pub fn add_comment(
    comments: &mut Vec<Comment>,
    seq: &mut u32,
    body: impl Into<String>,
    author: Option<String>,
) -> String {
    *seq += 1;
    let id = format!("C{}", *seq);
    comments.push(Comment {
        id: id.clone(),
        author,
        body: body.into(),
        created_at: Utc::now(),
    });
    id
}

/// Remove a comment by ID. Returns `true` if found and removed.
pub fn resolve_comment(comments: &mut Vec<Comment>, id: &str) -> bool {
    if let Some(pos) = comments.iter().position(|c| c.id == id) {
        comments.remove(pos);
        true
    } else {
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
