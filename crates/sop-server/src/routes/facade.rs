use axum::extract::{Path, State};
use axum::{Extension, Json};

use sop_core::issue::Issue;
use sop_core::SopError;

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::routes::issues::{apply_patch, issue_json, PatchIssueBody};
use crate::state::AppState;

/// Load an issue as seen by `owner`.
///
/// Rows owned by anyone else read as not-found so the facade never reveals
/// their existence.
fn load_owned(root: &std::path::Path, owner: &str, id: &str) -> Result<Issue, SopError> {
    let issue = Issue::load(root, id)?;
    if issue.owner.as_deref() != Some(owner) || issue.archived {
        return Err(SopError::IssueNotFound(id.to_string()));
    }
    Ok(issue)
}

/// GET /v1/issues — the caller's issues.
pub async fn list_issues(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let list: Vec<serde_json::Value> = Issue::list_for_owner(&root, &auth.owner)?
            .iter()
            .filter(|i| !i.archived)
            .map(issue_json)
            .collect();
        Ok::<_, SopError>(serde_json::json!({ "data": list, "count": list.len() }))
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
}

/// POST /v1/issues — open an issue owned by the caller.
pub async fn create_issue(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateIssueBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut issue = Issue::create(&root, body.object_slug, body.title)?;
        if let Some(severity) = body.severity {
            issue.severity = severity.parse()?;
        }
        issue.description = body.description;
        issue.owner = Some(auth.owner);
        issue.save(&root)?;
        Ok::<_, SopError>(serde_json::json!({ "data": issue_json(&issue) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /v1/issues/:id — detail, owner-scoped.
pub async fn get_issue(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let issue = load_owned(&root, &auth.owner, &id)?;
        Ok::<_, SopError>(serde_json::json!({ "data": issue_json(&issue) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// PATCH /v1/issues/:id — update fields, owner-scoped. The owner field
/// cannot be reassigned through the facade.
pub async fn patch_issue(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(mut body): Json<PatchIssueBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    body.owner = None;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut issue = load_owned(&root, &auth.owner, &id)?;
        apply_patch(&mut issue, body)?;
        issue.save(&root)?;
        Ok::<_, SopError>(serde_json::json!({ "data": issue_json(&issue) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /v1/issues/:id — archive (soft delete), owner-scoped.
pub async fn delete_issue(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut issue = load_owned(&root, &auth.owner, &id)?;
        issue.set_archived(true);
        issue.save(&root)?;
        Ok::<_, SopError>(serde_json::json!({ "data": { "id": issue.id, "archived": true } }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /v1/issues/:id/close — close, owner-scoped.
pub async fn close_issue(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut issue = load_owned(&root, &auth.owner, &id)?;
        issue.close();
        issue.save(&root)?;
        Ok::<_, SopError>(serde_json::json!({ "data": issue_json(&issue) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
