use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;

use sop_core::issue::Issue;
use sop_core::types::{IssueSeverity, IssueStatus};

use crate::error::AppError;
use crate::state::AppState;

pub(crate) fn issue_json(i: &Issue) -> serde_json::Value {
    serde_json::json!({
        "id": i.id,
        "object_slug": i.object_slug,
        "title": i.title,
        "description": i.description,
        "severity": i.severity,
        "status": i.status,
        "owner": i.owner,
        "source_meeting": i.source_meeting,
        "comments": i.comments,
        "aging_days": i.aging_days(Utc::now()),
        "archived": i.archived,
        "created_at": i.created_at,
        "updated_at": i.updated_at,
        "closed_at": i.closed_at,
    })
}

#[derive(serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
}

/// GET /api/issues — list issues, optionally filtered by object and status.
pub async fn list_issues(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let status = query
            .status
            .as_deref()
            .map(str::parse::<IssueStatus>)
            .transpose()?;
        let list: Vec<serde_json::Value> = Issue::list(&root)?
            .iter()
            .filter(|i| query.include_archived || !i.archived)
            .filter(|i| query.object.as_deref().map_or(true, |o| i.object_slug == o))
            .filter(|i| status.map_or(true, |s| i.status == s))
            .map(issue_json)
            .collect();
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": list, "count": list.len() }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CreateIssueBody {
    pub object_slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// POST /api/issues — open an issue against an object.
pub async fn create_issue(
    State(app): State<AppState>,
    Json(body): Json<CreateIssueBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut issue = Issue::create(&root, body.object_slug, body.title)?;
        if let Some(severity) = body.severity {
            issue.severity = severity.parse::<IssueSeverity>()?;
        }
        issue.description = body.description;
        issue.owner = body.owner;
        issue.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": issue_json(&issue) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/issues/:id — issue detail.
pub async fn get_issue(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let issue = Issue::load(&root, &id)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": issue_json(&issue) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize, Default)]
pub struct PatchIssueBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

pub(crate) fn apply_patch(issue: &mut Issue, body: PatchIssueBody) -> Result<(), sop_core::SopError> {
    if let Some(title) = body.title {
        issue.title = title;
    }
    if let Some(description) = body.description {
        issue.description = Some(description);
    }
    if let Some(severity) = body.severity {
        issue.severity = severity.parse::<IssueSeverity>()?;
    }
    if let Some(status) = body.status {
        issue.set_status(status.parse::<IssueStatus>()?);
    }
    if let Some(owner) = body.owner {
        issue.owner = Some(owner);
    }
    issue.updated_at = Utc::now();
    Ok(())
}

/// PATCH /api/issues/:id — update issue fields.
pub async fn patch_issue(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PatchIssueBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut issue = Issue::load(&root, &id)?;
        apply_patch(&mut issue, body)?;
        issue.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": issue_json(&issue) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/issues/:id/close — close the issue.
pub async fn close_issue(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut issue = Issue::load(&root, &id)?;
        issue.close();
        issue.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": issue_json(&issue) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CommentBody {
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// POST /api/issues/:id/comments — append a comment.
pub async fn add_issue_comment(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut issue = Issue::load(&root, &id)?;
        let comment_id = issue.add_comment(body.body, body.author);
        issue.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": { "id": comment_id } }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
