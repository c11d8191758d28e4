use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;

use sop_core::object::Object;
use sop_core::types::Stage;

use crate::error::AppError;
use crate::state::AppState;

fn summary(o: &Object, now: chrono::DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "slug": o.slug,
        "title": o.title,
        "owner": o.owner,
        "stage": o.stage,
        "progress_percent": o.progress_percent(),
        "aging_days": o.aging_days(now),
        "archived": o.archived,
        "updated_at": o.updated_at,
    })
}

fn detail(o: &Object, now: chrono::DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "slug": o.slug,
        "title": o.title,
        "description": o.description,
        "owner": o.owner,
        "stage": o.stage,
        "progress_percent": o.progress_percent(),
        "aging_days": o.aging_days(now),
        "stage_history": o.stage_history,
        "comments": o.comments,
        "archived": o.archived,
        "created_at": o.created_at,
        "updated_at": o.updated_at,
    })
}

#[derive(serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// GET /api/objects — list objects, newest last.
pub async fn list_objects(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let now = Utc::now();
        let list: Vec<serde_json::Value> = Object::list(&root)?
            .iter()
            .filter(|o| query.include_archived || !o.archived)
            .map(|o| summary(o, now))
            .collect();
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": list, "count": list.len() }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CreateObjectBody {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// POST /api/objects — create a migration object.
pub async fn create_object(
    State(app): State<AppState>,
    Json(body): Json<CreateObjectBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut object = Object::create(&root, body.slug, body.title)?;
        if let Some(description) = body.description {
            object.set_description(description);
        }
        if let Some(owner) = body.owner {
            object.set_owner(owner);
        }
        object.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": detail(&object, Utc::now()) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/objects/:slug — full object detail.
pub async fn get_object(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let object = Object::load(&root, &slug)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": detail(&object, Utc::now()) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct PatchObjectBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// PATCH /api/objects/:slug — update title, description, or owner.
pub async fn patch_object(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<PatchObjectBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut object = Object::load(&root, &slug)?;
        if let Some(title) = body.title {
            object.update_title(title);
        }
        if let Some(description) = body.description {
            object.set_description(description);
        }
        if let Some(owner) = body.owner {
            object.set_owner(owner);
        }
        object.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": detail(&object, Utc::now()) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct AdvanceBody {
    pub stage: String,
}

/// POST /api/objects/:slug/advance — move the object to a later stage.
pub async fn advance_object(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<AdvanceBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut object = Object::load(&root, &slug)?;
        let target: Stage = body.stage.parse()?;
        object.advance(target)?;
        object.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({
            "data": {
                "slug": object.slug,
                "stage": object.stage,
                "progress_percent": object.progress_percent(),
            }
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/objects/:slug/archive — soft-delete the object.
pub async fn archive_object(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut object = Object::load(&root, &slug)?;
        object.set_archived(true);
        object.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({
            "data": { "slug": object.slug, "archived": true }
        }))
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

/// POST /api/objects/:slug/comments — append a comment.
pub async fn add_object_comment(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut object = Object::load(&root, &slug)?;
        let id = object.add_comment(body.body, body.author);
        object.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": { "id": id } }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
