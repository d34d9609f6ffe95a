//! Issue library routes: upload, listing, publishing, page rendering,
//! mapped areas and reader hotspots.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{AreaRepository, Issue, IssueRepository, NewIssue, StoredArea};
use crate::error::{AppError, Result};
use crate::geometry::{ContainerSize, PercentRect, PixelRect};
use crate::mapper::{self, Category, MappedArea, Snippet};
use crate::pdf::IssueDocument;
use crate::state::AppState;

/// Upload size limit for issue PDFs.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_issues).post(upload_issue))
        .route("/:id", get(get_issue).delete(delete_issue))
        .route("/:id/publish", put(toggle_publish))
        .route("/:id/view", post(record_view))
        .route("/:id/pages/:page", get(render_page))
        .route("/:id/pages/:page/hotspots", get(page_hotspots))
        .route("/:id/areas", get(list_areas).post(create_area))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    /// `true` restricts the listing to published issues (reader gallery).
    published: Option<bool>,
}

async fn list_issues(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Issue>>> {
    let repo = IssueRepository::new(state.db());
    let issues = if query.published.unwrap_or(false) {
        repo.list_published().await?
    } else {
        repo.list_all().await?
    };
    Ok(Json(issues))
}

async fn upload_issue(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut issue_date: Option<String> = None;
    let mut pdf_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                title = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid title field: {}", e))
                })?);
            }
            "description" => {
                description = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid description field: {}", e))
                })?);
            }
            "issueDate" => {
                issue_date = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid issueDate field: {}", e))
                })?);
            }
            "pdf" => {
                pdf_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid PDF field: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing title".to_string()))?;
    let pdf_data = pdf_data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing PDF file".to_string()))?;

    // Validate the PDF and count pages before anything hits the database.
    let probe = pdf_data.clone();
    let page_count = tokio::task::spawn_blocking(move || {
        IssueDocument::from_bytes(probe, String::new()).map(|doc| doc.page_count())
    })
    .await
    .map_err(|e| AppError::Internal(format!("PDF probe task failed: {}", e)))?
    .map_err(|e| AppError::BadRequest(format!("Invalid PDF: {}", e)))?;

    let repo = IssueRepository::new(state.db());
    let issue = repo
        .create(NewIssue {
            title,
            description,
            issue_date,
            page_count,
            pdf_data: pdf_data.clone(),
        })
        .await?;

    tracing::info!(issue_id = %issue.id, pages = page_count, "Issue uploaded");

    // Warm the cache; the admin usually starts mapping right away.
    state.pages().load_from_bytes(&issue.id, pdf_data).await?;

    Ok((StatusCode::CREATED, Json(issue)))
}

/// Issue detail: metadata plus its mapped areas.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueDetail {
    #[serde(flatten)]
    issue: Issue,
    mapped_areas: Vec<StoredArea>,
}

async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IssueDetail>> {
    let repo = IssueRepository::new(state.db());
    let issue = repo
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Issue not found: {}", id)))?;

    let mapped_areas = AreaRepository::new(state.db()).list_for_issue(&id).await?;
    Ok(Json(IssueDetail {
        issue,
        mapped_areas,
    }))
}

async fn delete_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let repo = IssueRepository::new(state.db());
    if !repo.delete(&id).await? {
        return Err(AppError::NotFound(format!("Issue not found: {}", id)));
    }
    state.pages().remove(&id).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_publish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Issue>> {
    let repo = IssueRepository::new(state.db());
    let issue = repo
        .toggle_publish(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Issue not found: {}", id)))?;
    Ok(Json(issue))
}

async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let repo = IssueRepository::new(state.db());
    if !repo.increment_view_count(&id).await? {
        return Err(AppError::NotFound(format!("Issue not found: {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct RenderQuery {
    scale: Option<f32>,
}

async fn render_page(
    State(state): State<AppState>,
    Path((id, page)): Path<(String, u32)>,
    Query(query): Query<RenderQuery>,
) -> Result<impl IntoResponse> {
    super::ensure_loaded(&state, &id).await?;

    let scale = query.scale.unwrap_or(state.config().render.default_scale);
    let rendered = state.pages().render_page(&id, page, scale).await?;

    Ok((
        [
            (header::CONTENT_TYPE, crate::pdf::RenderedPage::CONTENT_TYPE),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        rendered.data.clone(),
    ))
}

async fn list_areas(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StoredArea>>> {
    let issues = IssueRepository::new(state.db());
    if issues.get(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Issue not found: {}", id)));
    }

    let areas = AreaRepository::new(state.db());
    Ok(Json(areas.list_for_issue(&id).await?))
}

/// Direct area creation; coordinates arrive already normalized to
/// percentage space by the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAreaRequest {
    page_number: u32,
    coordinates: PercentRect,
    #[serde(default)]
    headline: String,
    #[serde(default)]
    category: Category,
    /// Pre-captured snippet (`data:` URL). When absent the server crops one
    /// out of the rendered page itself.
    #[serde(default)]
    image_data: Option<String>,
}

async fn create_area(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateAreaRequest>,
) -> Result<impl IntoResponse> {
    let issues = IssueRepository::new(state.db());
    let issue = issues
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Issue not found: {}", id)))?;

    if req.page_number == 0 || i64::from(req.page_number) > issue.page_count {
        return Err(AppError::BadRequest(format!(
            "Page {} out of range (issue has {} pages)",
            req.page_number, issue.page_count
        )));
    }

    // Validate what will actually be stored: clamping can collapse a rect
    // that only overhangs the page to zero extent.
    let coordinates = req.coordinates.clamped();
    if !coordinates.has_area() {
        return Err(AppError::BadRequest(
            "Area must have positive width and height inside the page".to_string(),
        ));
    }

    let extracted = match req.image_data {
        Some(data) => Some(data),
        None => crop_snippet(&state, &id, req.page_number, coordinates)
            .await?
            .map(|s| s.to_data_url()),
    };

    let area = MappedArea {
        page_number: req.page_number,
        coordinates,
        headline: req.headline,
        category: req.category,
        extracted_image_url: extracted,
    };

    let repo = AreaRepository::new(state.db());
    let stored = repo.create(&id, &area).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Server-side snippet crop out of a freshly rendered page. Soft-fails to
/// `None`; an area without a snippet is still useful. Callers inspect the
/// returned snippet for the suspicious-size flag.
pub(crate) async fn crop_snippet(
    state: &AppState,
    issue_id: &str,
    page: u32,
    coordinates: PercentRect,
) -> Result<Option<Snippet>> {
    super::ensure_loaded(state, issue_id).await?;

    let scale = state.config().render.snippet_scale;
    let rendered = state.pages().render_page(issue_id, page, scale).await?;
    let raster = rendered.decode();

    // The raster itself is the reference space here, so crop math is exact.
    let raster_size = ContainerSize::new(
        f64::from(rendered.width),
        f64::from(rendered.height),
    );
    let snippet = mapper::extract(coordinates, raster.as_ref(), raster_size);

    match &snippet {
        Some(s) if s.is_suspicious() => {
            tracing::warn!(
                issue_id,
                page,
                bytes = s.len(),
                "Extracted snippet is implausibly small"
            );
        }
        Some(_) => {}
        None => {
            tracing::warn!(issue_id, page, "Snippet extraction produced no image");
        }
    }

    Ok(snippet)
}

#[derive(Debug, Deserialize)]
struct HotspotQuery {
    /// Pixel size of the container the viewer is displaying the page in.
    width: f64,
    height: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HotspotResponse {
    rect: PixelRect,
    z_index: u32,
    area: StoredArea,
}

async fn page_hotspots(
    State(state): State<AppState>,
    Path((id, page)): Path<(String, u32)>,
    Query(query): Query<HotspotQuery>,
) -> Result<Json<Vec<HotspotResponse>>> {
    let container = ContainerSize::new(query.width, query.height);
    if !container.is_valid() {
        return Err(AppError::BadRequest(
            "Container dimensions must be positive".to_string(),
        ));
    }

    let issues = IssueRepository::new(state.db());
    if issues.get(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Issue not found: {}", id)));
    }

    let stored = AreaRepository::new(state.db()).list_for_issue(&id).await?;
    let areas: Vec<MappedArea> = stored.iter().map(|s| s.area.clone()).collect();

    let hotspots = mapper::project(&areas, page, container)
        .into_iter()
        .map(|h| HotspotResponse {
            rect: h.rect,
            z_index: h.z_index,
            area: stored[h.area_index].clone(),
        })
        .collect();

    Ok(Json(hotspots))
}
