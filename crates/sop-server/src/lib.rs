pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    router_with_state(state::AppState::new(root))
}

/// Like [`build_router`] but with an explicit LLM config, so tests can point
/// the minutes routes at a mock server.
pub fn build_router_with_llm(root: PathBuf, llm: minutes_agent::LlmConfig) -> Router {
    router_with_state(state::AppState::with_llm(root, llm))
}

fn router_with_state(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let facade = Router::new()
        .route("/v1/issues", get(routes::facade::list_issues))
        .route("/v1/issues", post(routes::facade::create_issue))
        .route("/v1/issues/{id}", get(routes::facade::get_issue))
        .route("/v1/issues/{id}", axum::routing::patch(routes::facade::patch_issue))
        .route("/v1/issues/{id}", delete(routes::facade::delete_issue))
        .route("/v1/issues/{id}/close", post(routes::facade::close_issue))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_token,
        ));

    Router::new()
        // Objects
        .route("/api/objects", get(routes::objects::list_objects))
        .route("/api/objects", post(routes::objects::create_object))
        .route("/api/objects/{slug}", get(routes::objects::get_object))
        .route(
            "/api/objects/{slug}",
            axum::routing::patch(routes::objects::patch_object),
        )
        .route(
            "/api/objects/{slug}/advance",
            post(routes::objects::advance_object),
        )
        .route(
            "/api/objects/{slug}/archive",
            post(routes::objects::archive_object),
        )
        .route(
            "/api/objects/{slug}/comments",
            post(routes::objects::add_object_comment),
        )
        // Issues
        .route("/api/issues", get(routes::issues::list_issues))
        .route("/api/issues", post(routes::issues::create_issue))
        .route("/api/issues/{id}", get(routes::issues::get_issue))
        .route(
            "/api/issues/{id}",
            axum::routing::patch(routes::issues::patch_issue),
        )
        .route("/api/issues/{id}/close", post(routes::issues::close_issue))
        .route(
            "/api/issues/{id}/comments",
            post(routes::issues::add_issue_comment),
        )
        // Meetings
        .route("/api/meetings", get(routes::meetings::list_meetings))
        .route("/api/meetings", post(routes::meetings::create_meeting))
        .route("/api/meetings/{id}", get(routes::meetings::get_meeting))
        .route(
            "/api/meetings/{id}/transcript",
            post(routes::meetings::set_transcript),
        )
        .route(
            "/api/meetings/{id}/minutes",
            post(routes::meetings::generate_minutes),
        )
        .route(
            "/api/meetings/{id}/link-actions",
            post(routes::meetings::link_actions),
        )
        .route("/api/email/polish", post(routes::meetings::polish_email))
        // Recurring meetings
        .route("/api/recurring", get(routes::recurring::list_recurring))
        .route("/api/recurring", post(routes::recurring::create_recurring))
        .route("/api/recurring/{slug}", get(routes::recurring::get_recurring))
        .route(
            "/api/recurring/{slug}/occurrences",
            get(routes::recurring::occurrences),
        )
        .route(
            "/api/recurring/{slug}/log",
            put(routes::recurring::upsert_log),
        )
        // Reports
        .route("/api/reports/export.xlsx", get(routes::reports::export_xlsx))
        // Tokens
        .route("/api/tokens", post(routes::tokens::create_token))
        .route("/api/tokens", get(routes::tokens::list_tokens))
        .route("/api/tokens/{id}/revoke", post(routes::tokens::revoke_token))
        // Pins
        .route("/api/pins/{user}", get(routes::pins::list_pins))
        .route("/api/pins/{user}", post(routes::pins::add_pin))
        .route("/api/pins/{user}/{slug}", delete(routes::pins::remove_pin))
        // External facade
        .merge(facade)
        .layer(cors)
        .with_state(app_state)
}

/// Start the tracker API server.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let app = build_router(root);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("S&OP tracker listening on http://localhost:{port}");

    if open_browser {
        let url = format!("http://localhost:{port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}

/// Start the server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root);

    tracing::info!("S&OP tracker listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
