use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use sop_core::token::TokenRegistry;
use sop_core::types::TokenScope;

use crate::error::AppError;
use crate::state::AppState;

/// Identity attached to an authenticated facade request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub owner: String,
    pub scopes: Vec<TokenScope>,
}

/// Bearer-token middleware for the `/v1` facade.
///
/// Looks the presented token up by SHA-256 digest, rejects revoked tokens,
/// and enforces `issues:read` for GET and `issues:write` for everything else.
/// On success an [`AuthContext`] is attached to the request extensions.
pub async fn require_token(
    State(app): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

    let plaintext = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("expected Bearer token"))?
        .trim()
        .to_string();

    let root = app.root.clone();
    let registry = tokio::task::spawn_blocking(move || TokenRegistry::load(&root))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let token = registry
        .authenticate(&plaintext)
        .ok_or_else(|| AppError::unauthorized("unknown or revoked token"))?;

    let needed = if request.method() == axum::http::Method::GET {
        TokenScope::IssuesRead
    } else {
        TokenScope::IssuesWrite
    };
    if !token.has_scope(needed) {
        return Err(AppError::forbidden(format!("token lacks {needed} scope")));
    }

    request.extensions_mut().insert(AuthContext {
        owner: token.owner.clone(),
        scopes: token.scopes.clone(),
    });
    Ok(next.run(request).await)
}
