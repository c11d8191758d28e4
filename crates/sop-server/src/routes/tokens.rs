use axum::extract::{Path, State};
use axum::Json;

use sop_core::token::TokenRegistry;
use sop_core::types::TokenScope;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct CreateTokenBody {
    pub name: String,
    pub owner: String,
    pub scopes: Vec<TokenScope>,
}

/// POST /api/tokens — mint a token. The plaintext appears in this response
/// and nowhere else.
pub async fn create_token(
    State(app): State<AppState>,
    Json(body): Json<CreateTokenBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut registry = TokenRegistry::load(&root)?;
        let (token, plaintext) = registry.create(&root, body.name, body.owner, body.scopes)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({
            "data": {
                "id": token.id,
                "name": token.name,
                "owner": token.owner,
                "prefix": token.prefix,
                "scopes": token.scopes,
                "token": plaintext,
            }
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/tokens — list tokens. Digests stay server-side; only display
/// prefixes are returned.
pub async fn list_tokens(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let registry = TokenRegistry::load(&root)?;
        let list: Vec<serde_json::Value> = registry
            .tokens
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "name": t.name,
                    "owner": t.owner,
                    "prefix": t.prefix,
                    "scopes": t.scopes,
                    "created_at": t.created_at,
                    "revoked": t.revoked,
                })
            })
            .collect();
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": list, "count": list.len() }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/tokens/:id/revoke — permanently disable a token.
pub async fn revoke_token(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut registry = TokenRegistry::load(&root)?;
        registry.revoke(&root, &id)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": { "id": id, "revoked": true } }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
