//! Admin mapping session routes
//!
//! A mapping session is the server-held drawing state for one admin marking
//! up one issue: pointer events move a rectangle through the idle/drawing/
//! active cycle, and save turns the active rectangle into a persisted
//! mapped area plus a cropped snippet.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{AreaRepository, IssueRepository, StoredArea};
use crate::error::{AppError, Result};
use crate::geometry::{ContainerSize, PixelRect};
use crate::mapper::{Category, EditorSession, SavePayload, Snippet};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(open_session))
        .route("/:sid", get(session_state).delete(close_session))
        .route("/:sid/pointer", post(pointer_event))
        .route("/:sid/page", put(set_page))
        .route("/:sid/canvas", put(set_canvas))
        .route("/:sid/save", post(save_area))
        .route("/:sid/cancel", post(cancel_shape))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenSessionRequest {
    issue_id: String,
    #[serde(default = "default_page")]
    page_number: u32,
    canvas_width: f64,
    canvas_height: f64,
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionSnapshot {
    session_id: Uuid,
    issue_id: String,
    page_number: u32,
    phase: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rect: Option<PixelRect>,
    save_in_flight: bool,
}

impl SessionSnapshot {
    fn of(id: Uuid, session: &EditorSession) -> Self {
        SessionSnapshot {
            session_id: id,
            issue_id: session.issue_id().to_string(),
            page_number: session.page(),
            phase: session.phase().name(),
            rect: session.current_rect(),
            save_in_flight: session.save_in_flight(),
        }
    }
}

async fn open_session(
    State(state): State<AppState>,
    Json(req): Json<OpenSessionRequest>,
) -> Result<impl IntoResponse> {
    let issues = IssueRepository::new(state.db());
    let issue = issues
        .get(&req.issue_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Issue not found: {}", req.issue_id)))?;

    if req.page_number == 0 || i64::from(req.page_number) > issue.page_count {
        return Err(AppError::BadRequest(format!(
            "Page {} out of range (issue has {} pages)",
            req.page_number, issue.page_count
        )));
    }

    let canvas = ContainerSize::new(req.canvas_width, req.canvas_height);
    let session = EditorSession::new(req.issue_id, req.page_number, canvas)?;
    let snapshot_base = SessionSnapshot::of(Uuid::nil(), &session);
    let id = state.open_session(session).await;

    tracing::debug!(session_id = %id, issue_id = %snapshot_base.issue_id, "Mapping session opened");

    Ok((
        StatusCode::CREATED,
        Json(SessionSnapshot {
            session_id: id,
            ..snapshot_base
        }),
    ))
}

async fn session_state(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionSnapshot>> {
    let session = lookup(&state, &sid).await?;
    let session = session.lock().await;
    Ok(Json(SessionSnapshot::of(sid, &session)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "event")]
enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
}

async fn pointer_event(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(event): Json<PointerEvent>,
) -> Result<Json<SessionSnapshot>> {
    let session = lookup(&state, &sid).await?;
    let mut session = session.lock().await;

    match event {
        PointerEvent::Down { x, y } => session.pointer_down(x, y)?,
        PointerEvent::Move { x, y } => session.pointer_move(x, y),
        PointerEvent::Up => {
            session.pointer_up();
        }
    }

    Ok(Json(SessionSnapshot::of(sid, &session)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetPageRequest {
    page_number: u32,
}

async fn set_page(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(req): Json<SetPageRequest>,
) -> Result<Json<SessionSnapshot>> {
    let session = lookup(&state, &sid).await?;
    let mut session = session.lock().await;

    let issues = IssueRepository::new(state.db());
    let issue = issues
        .get(session.issue_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Issue no longer exists".to_string()))?;
    if req.page_number == 0 || i64::from(req.page_number) > issue.page_count {
        return Err(AppError::BadRequest(format!(
            "Page {} out of range (issue has {} pages)",
            req.page_number, issue.page_count
        )));
    }

    session.set_page(req.page_number);
    Ok(Json(SessionSnapshot::of(sid, &session)))
}

#[derive(Debug, Deserialize)]
struct SetCanvasRequest {
    width: f64,
    height: f64,
}

async fn set_canvas(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(req): Json<SetCanvasRequest>,
) -> Result<Json<SessionSnapshot>> {
    let session = lookup(&state, &sid).await?;
    let mut session = session.lock().await;
    session.set_canvas(ContainerSize::new(req.width, req.height))?;
    Ok(Json(SessionSnapshot::of(sid, &session)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveRequest {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    category: Category,
    /// Client-captured snippet (`data:` URL); when absent the server crops
    /// one from its own render of the page.
    #[serde(default)]
    image_data: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveResponse {
    area: StoredArea,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

async fn save_area(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(req): Json<SaveRequest>,
) -> Result<impl IntoResponse> {
    let session = lookup(&state, &sid).await?;
    let mut session = session.lock().await;

    let payload = session.begin_save(req.headline, req.category)?;
    let result = persist_area(&state, &payload, req.image_data).await;

    match result {
        Ok(response) => {
            session.complete_save(payload.page_number);
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            // The active shape stays put so the admin can retry without
            // redrawing.
            session.fail_save();
            Err(e)
        }
    }
}

/// Turn an extraction result into the persistable URL plus the user-facing
/// warning for implausible or missing captures.
fn snippet_outcome(snippet: Option<Snippet>) -> (Option<String>, Option<String>) {
    match snippet {
        Some(s) if s.is_suspicious() => (
            Some(s.to_data_url()),
            Some(
                "Extracted snippet is unusually small; it may not have captured correctly"
                    .to_string(),
            ),
        ),
        Some(s) => (Some(s.to_data_url()), None),
        None => (
            None,
            Some(
                "No image snippet could be extracted; the area was saved without one"
                    .to_string(),
            ),
        ),
    }
}

async fn persist_area(
    state: &AppState,
    payload: &SavePayload,
    image_data: Option<String>,
) -> Result<SaveResponse> {
    let mut warning = None;

    let extracted = match image_data {
        Some(data) => {
            if data.len() < crate::mapper::MIN_PLAUSIBLE_BYTES {
                warning = Some(
                    "Captured image is unusually small; it may not have saved correctly"
                        .to_string(),
                );
            }
            Some(data)
        }
        None => {
            let cropped = super::issues::crop_snippet(
                state,
                &payload.issue_id,
                payload.page_number,
                payload.coordinates,
            )
            .await?;
            let (url, crop_warning) = snippet_outcome(cropped);
            warning = crop_warning;
            url
        }
    };

    let area = payload.clone().into_area(extracted);
    let repo = AreaRepository::new(state.db());
    let stored = repo.create(&payload.issue_id, &area).await?;

    tracing::info!(
        area_id = %stored.id,
        issue_id = %payload.issue_id,
        page = payload.page_number,
        "Mapped area saved"
    );

    Ok(SaveResponse {
        area: stored,
        warning,
    })
}

async fn cancel_shape(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionSnapshot>> {
    let session = lookup(&state, &sid).await?;
    let mut session = session.lock().await;
    session.cancel();
    Ok(Json(SessionSnapshot::of(sid, &session)))
}

async fn close_session(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.close_session(&sid).await {
        return Err(AppError::NotFound(format!("Session not found: {}", sid)));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn lookup(
    state: &AppState,
    sid: &Uuid,
) -> Result<std::sync::Arc<tokio::sync::Mutex<EditorSession>>> {
    state
        .session(sid)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {}", sid)))
}
