use axum::extract::{Path, State};
use axum::Json;

use sop_core::pins::Pins;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/pins/:user — slugs the user has pinned, in pin order.
pub async fn list_pins(
    State(app): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let pins = Pins::load(&root)?;
        let list = pins.for_user(&user).to_vec();
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": list, "count": list.len() }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct PinBody {
    pub slug: String,
}

/// POST /api/pins/:user — pin an object. Idempotent.
pub async fn add_pin(
    State(app): State<AppState>,
    Path(user): Path<String>,
    Json(body): Json<PinBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut pins = Pins::load(&root)?;
        pins.pin(&user, &body.slug);
        pins.save(&root)?;
        let list = pins.for_user(&user).to_vec();
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": list }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/pins/:user/:slug — unpin an object. Tolerant of absence.
pub async fn remove_pin(
    State(app): State<AppState>,
    Path((user, slug)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut pins = Pins::load(&root)?;
        pins.unpin(&user, &slug);
        pins.save(&root)?;
        let list = pins.for_user(&user).to_vec();
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": list }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
