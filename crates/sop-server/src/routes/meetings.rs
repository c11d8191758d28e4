use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;

use minutes_agent::MinutesMode;
use sop_core::meeting::{link_action_items, ActionItem, Meeting, Minutes};

use crate::error::AppError;
use crate::state::AppState;

fn meeting_json(m: &Meeting) -> serde_json::Value {
    serde_json::json!({
        "id": m.id,
        "title": m.title,
        "held_on": m.held_on,
        "attendees": m.attendees,
        "has_transcript": m.transcript.is_some(),
        "minutes": m.minutes,
        "action_items": m.action_items,
        "linked_issues": m.linked_issues,
        "created_at": m.created_at,
        "updated_at": m.updated_at,
    })
}

/// GET /api/meetings — list meetings by held date.
pub async fn list_meetings(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let list: Vec<serde_json::Value> = Meeting::list(&root)?.iter().map(meeting_json).collect();
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": list, "count": list.len() }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CreateMeetingBody {
    pub title: String,
    pub held_on: NaiveDate,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
}

/// POST /api/meetings — record a held meeting.
pub async fn create_meeting(
    State(app): State<AppState>,
    Json(body): Json<CreateMeetingBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut meeting = Meeting::create(&root, body.title, body.held_on)?;
        meeting.attendees = body.attendees;
        for item in body.action_items {
            meeting.add_action_item(item);
        }
        meeting.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": meeting_json(&meeting) }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/meetings/:id — meeting detail including the transcript.
pub async fn get_meeting(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let meeting = Meeting::load(&root, &id)?;
        let mut json = meeting_json(&meeting);
        json["transcript"] = serde_json::json!(meeting.transcript);
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": json }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct TranscriptBody {
    pub transcript: String,
}

/// POST /api/meetings/:id/transcript — attach the raw transcript.
pub async fn set_transcript(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TranscriptBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut meeting = Meeting::load(&root, &id)?;
        meeting.set_transcript(body.transcript);
        meeting.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({
            "data": { "id": meeting.id, "transcript_chars": meeting.transcript.as_deref().map(str::len) }
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize, Default)]
pub struct MinutesBody {
    #[serde(default)]
    pub mode: Option<MinutesMode>,
}

/// POST /api/meetings/:id/minutes — generate and store minutes-of-meeting.
pub async fn generate_minutes(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MinutesBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let load_id = id.clone();
    let meeting = tokio::task::spawn_blocking(move || Meeting::load(&root, &load_id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let transcript = meeting
        .transcript
        .clone()
        .ok_or_else(|| AppError::bad_request(format!("meeting {id} has no transcript")))?;

    let client = app
        .minutes_client()
        .map_err(|e| AppError::upstream(e.to_string()))?;
    let draft = client
        .generate_minutes(
            &meeting.title,
            &transcript,
            body.mode.unwrap_or_default(),
        )
        .await
        .map_err(|e| AppError::upstream(e.to_string()))?;

    let minutes = Minutes {
        tldr: draft.tldr,
        discussion_points: draft.discussion_points,
        next_steps: draft.next_steps,
        action_log: draft.action_log,
        quote: draft.quote,
        model_used: draft.model_used,
    };

    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut meeting = Meeting::load(&root, &id)?;
        meeting.set_minutes(minutes);
        meeting.save(&root)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({ "data": meeting.minutes }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/meetings/:id/link-actions — convert pending action items to
/// issues. Already-linked items are skipped, so retries resume mid-batch.
pub async fn link_actions(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut meeting = Meeting::load(&root, &id)?;
        let created = link_action_items(&root, &mut meeting)?;
        Ok::<_, sop_core::SopError>(serde_json::json!({
            "data": { "created": created, "linked_issues": meeting.linked_issues }
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct EmailBody {
    pub subject: String,
    pub body: String,
}

/// POST /api/email/polish — rewrite a rough email draft.
///
/// Never fails on LLM trouble: the client degrades to a local template.
pub async fn polish_email(
    State(app): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let client = app
        .minutes_client()
        .map_err(|e| AppError::upstream(e.to_string()))?;
    let draft = client.polish_email(&body.subject, &body.body).await;
    Ok(Json(serde_json::json!({ "data": draft })))
}
