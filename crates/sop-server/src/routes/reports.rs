use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::AppError;
use crate::state::AppState;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// GET /api/reports/export.xlsx — download the status-report workbook.
pub async fn export_xlsx(State(app): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let root = app.root.clone();
    let bytes = tokio::task::spawn_blocking(move || sop_core::report::build_workbook(&root))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sop-status.xlsx\"",
            ),
        ],
        bytes,
    ))
}
