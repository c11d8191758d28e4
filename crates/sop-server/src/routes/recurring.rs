use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;

use sop_core::recurring::{Recurrence, RecurringMeeting, ScheduleLog};

use crate::error::AppError;
use crate::state::AppState;

fn recurring_json(m: &RecurringMeeting) -> serde_json::Value {
    serde_json::json!({
        "slug": m.slug,
        "title": m.title,
        "recurrence": m.recurrence,
        "logs": m.logs,
        "created_at": m.created_at,
        "updated_at": m.updated_at,
    })
}

/// GET /api/recurring — list recurring meeting templates.
pub async fn list_recurring(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let list: Vec<serde_json::Value> = RecurringMeeting::list(&root)?
            .iter()
            .map(recurring_json)
            .collect();
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": list, "count": list.len() }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CreateRecurringBody {
    pub slug: String,
    pub title: String,
    pub recurrence: Recurrence,
}

/// POST /api/recurring — create a recurring meeting template.
pub async fn create_recurring(
    State(app): State<AppState>,
    Json(body): Json<CreateRecurringBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let meeting = RecurringMeeting::create(&root, body.slug, body.title, body.recurrence)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": recurring_json(&meeting) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/recurring/:slug — template detail with logs.
pub async fn get_recurring(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let meeting = RecurringMeeting::load(&root, &slug)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": recurring_json(&meeting) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct OccurrencesQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// GET /api/recurring/:slug/occurrences?from=&to= — expand the schedule.
///
/// Each occurrence carries the log recorded for that date, if any.
pub async fn occurrences(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<OccurrencesQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let meeting = RecurringMeeting::load(&root, &slug)?;
        let dates = meeting.occurrences(query.from, query.to);
        let list: Vec<serde_json::Value> = dates
            .iter()
            .map(|d| {
                serde_json::json!({
                    "date": d,
                    "log": meeting.log_for(*d),
                })
            })
            .collect();
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": list, "count": list.len() }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct LogBody {
    pub date: NaiveDate,
    #[serde(default)]
    pub invite_sent: bool,
    #[serde(default)]
    pub attended: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// PUT /api/recurring/:slug/log — insert or replace the log for one date.
pub async fn upsert_log(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<LogBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut meeting = RecurringMeeting::load(&root, &slug)?;
        meeting.upsert_log(ScheduleLog {
            date: body.date,
            invite_sent: body.invite_sent,
            attended: body.attended,
            notes: body.notes,
        });
        meeting.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({
            "data": { "slug": meeting.slug, "logs": meeting.logs }
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
