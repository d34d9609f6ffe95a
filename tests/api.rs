//! End-to-end API tests: upload an issue, map an area through a drawing
//! session, and read the projected hotspots back.

use axum::{routing::get, Router};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};

use hemeroteca_server::{config::Config, db, routes, state::AppState};

/// Minimal valid PDF with `page_count` blank US Letter pages.
fn minimal_pdf(page_count: usize) -> Vec<u8> {
    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 3 + i)).collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        ),
    ];
    for _ in 0..page_count {
        objects.push("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>".to_string());
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, obj));
    }

    let xref_pos = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_pos
    ));

    out.into_bytes()
}

async fn test_server() -> (TestServer, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("test.db").display());
    let pool = db::create_pool(&url).await.unwrap();

    let app = Router::new()
        .route(
            "/health",
            get(|| async { axum::Json(json!({"status": "healthy"})) }),
        )
        .nest("/api/issues", routes::issues::router())
        .nest("/api/admin/mapper", routes::mapper::router())
        .with_state(AppState::new(Config::default(), pool));

    (TestServer::new(app).unwrap(), dir)
}

async fn upload_issue(server: &TestServer, title: &str, pages: usize) -> Value {
    let form = MultipartForm::new()
        .add_text("title", title)
        .add_text("issueDate", "2024-03-01")
        .add_part(
            "pdf",
            Part::bytes(minimal_pdf(pages))
                .file_name("issue.pdf")
                .mime_type("application/pdf"),
        );

    let response = server.post("/api/issues").multipart(form).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_upload_and_list() {
    let (server, _dir) = test_server().await;

    let issue = upload_issue(&server, "El Diario", 3).await;
    assert_eq!(issue["title"], "El Diario");
    assert_eq!(issue["pageCount"], 3);
    assert_eq!(issue["isPublished"], false);

    let all = server.get("/api/issues").await.json::<Value>();
    assert_eq!(all.as_array().unwrap().len(), 1);

    // Nothing published yet.
    let published = server
        .get("/api/issues")
        .add_query_param("published", "true")
        .await
        .json::<Value>();
    assert!(published.as_array().unwrap().is_empty());

    let id = issue["id"].as_str().unwrap();
    let toggled = server
        .put(&format!("/api/issues/{}/publish", id))
        .await
        .json::<Value>();
    assert_eq!(toggled["isPublished"], true);

    let published = server
        .get("/api/issues")
        .add_query_param("published", "true")
        .await
        .json::<Value>();
    assert_eq!(published.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_rejects_garbage_pdf() {
    let (server, _dir) = test_server().await;

    let form = MultipartForm::new().add_text("title", "Broken").add_part(
        "pdf",
        Part::bytes(b"not a pdf".to_vec())
            .file_name("issue.pdf")
            .mime_type("application/pdf"),
    );

    let response = server.post("/api/issues").multipart(form).await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_render_page() {
    let (server, _dir) = test_server().await;
    let issue = upload_issue(&server, "El Diario", 2).await;
    let id = issue["id"].as_str().unwrap();

    let response = server
        .get(&format!("/api/issues/{}/pages/1", id))
        .add_query_param("scale", "1.0")
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert!(!response.as_bytes().is_empty());

    let out_of_range = server.get(&format!("/api/issues/{}/pages/9", id)).await;
    out_of_range.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mapping_session_end_to_end() {
    let (server, _dir) = test_server().await;
    let issue = upload_issue(&server, "El Diario", 2).await;
    let id = issue["id"].as_str().unwrap();

    // Open a drawing session over a 1000x1400 canvas on page 1.
    let session = server
        .post("/api/admin/mapper")
        .json(&json!({
            "issueId": id,
            "pageNumber": 1,
            "canvasWidth": 1000.0,
            "canvasHeight": 1400.0,
        }))
        .await;
    session.assert_status(axum::http::StatusCode::CREATED);
    let session = session.json::<Value>();
    let sid = session["sessionId"].as_str().unwrap();
    assert_eq!(session["phase"], "idle");

    // Drag out a rectangle: (100,140) to (300,420).
    let pointer = |event: Value| {
        let path = format!("/api/admin/mapper/{}/pointer", sid);
        let server = &server;
        async move { server.post(&path).json(&event).await }
    };
    pointer(json!({"event": "down", "x": 100.0, "y": 140.0})).await;
    pointer(json!({"event": "move", "x": 300.0, "y": 420.0})).await;
    let up = pointer(json!({"event": "up"})).await.json::<Value>();
    assert_eq!(up["phase"], "active");
    assert_eq!(up["rect"]["left"], 100.0);
    assert_eq!(up["rect"]["width"], 200.0);

    // Starting another rectangle with one active is a conflict.
    let blocked = server
        .post(&format!("/api/admin/mapper/{}/pointer", sid))
        .json(&json!({"event": "down", "x": 0.0, "y": 0.0}))
        .await;
    blocked.assert_status(axum::http::StatusCode::CONFLICT);

    // Save with a server-side crop.
    let saved = server
        .post(&format!("/api/admin/mapper/{}/save", sid))
        .json(&json!({"headline": "Budget approved", "category": "politics"}))
        .await;
    saved.assert_status(axum::http::StatusCode::CREATED);
    let saved = saved.json::<Value>();
    let area = &saved["area"];
    assert_eq!(area["pageNumber"], 1);
    assert_eq!(area["headline"], "Budget approved");
    assert_eq!(area["category"], "politics");
    // Percent space: 100/1000 and 140/1400 both normalize to 10%.
    assert!((area["coordinates"]["x"].as_f64().unwrap() - 10.0).abs() < 0.01);
    assert!((area["coordinates"]["y"].as_f64().unwrap() - 10.0).abs() < 0.01);
    assert!((area["coordinates"]["width"].as_f64().unwrap() - 20.0).abs() < 0.01);
    assert!(area["extractedImageUrl"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));

    // The session returned to idle; saving again has no shape to save.
    let again = server
        .post(&format!("/api/admin/mapper/{}/save", sid))
        .json(&json!({"headline": "x"}))
        .await;
    again.assert_status(axum::http::StatusCode::BAD_REQUEST);

    // The area is listed for the issue.
    let areas = server
        .get(&format!("/api/issues/{}/areas", id))
        .await
        .json::<Value>();
    assert_eq!(areas.as_array().unwrap().len(), 1);

    // Hotspots project onto a half-size viewer container.
    let hotspots = server
        .get(&format!("/api/issues/{}/pages/1/hotspots", id))
        .add_query_param("width", "500")
        .add_query_param("height", "700")
        .await
        .json::<Value>();
    let hotspots = hotspots.as_array().unwrap();
    assert_eq!(hotspots.len(), 1);
    assert_eq!(hotspots[0]["zIndex"], 100);
    assert!((hotspots[0]["rect"]["left"].as_f64().unwrap() - 50.0).abs() < 0.01);
    assert!((hotspots[0]["rect"]["width"].as_f64().unwrap() - 100.0).abs() < 0.01);

    // Nothing on page 2.
    let empty = server
        .get(&format!("/api/issues/{}/pages/2/hotspots", id))
        .add_query_param("width", "500")
        .add_query_param("height", "700")
        .await
        .json::<Value>();
    assert!(empty.as_array().unwrap().is_empty());

    server
        .delete(&format!("/api/admin/mapper/{}", sid))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_page_switch_discards_unsaved_shape() {
    let (server, _dir) = test_server().await;
    let issue = upload_issue(&server, "El Diario", 2).await;
    let id = issue["id"].as_str().unwrap();

    let session = server
        .post("/api/admin/mapper")
        .json(&json!({
            "issueId": id,
            "canvasWidth": 1000.0,
            "canvasHeight": 1400.0,
        }))
        .await
        .json::<Value>();
    let sid = session["sessionId"].as_str().unwrap();

    server
        .post(&format!("/api/admin/mapper/{}/pointer", sid))
        .json(&json!({"event": "down", "x": 10.0, "y": 10.0}))
        .await;
    server
        .post(&format!("/api/admin/mapper/{}/pointer", sid))
        .json(&json!({"event": "move", "x": 200.0, "y": 200.0}))
        .await;
    server
        .post(&format!("/api/admin/mapper/{}/pointer", sid))
        .json(&json!({"event": "up"}))
        .await;

    let switched = server
        .put(&format!("/api/admin/mapper/{}/page", sid))
        .json(&json!({"pageNumber": 2}))
        .await
        .json::<Value>();
    assert_eq!(switched["phase"], "idle");
    assert_eq!(switched["pageNumber"], 2);

    // Nothing was persisted by the page switch.
    let areas = server
        .get(&format!("/api/issues/{}/areas", id))
        .await
        .json::<Value>();
    assert!(areas.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_direct_area_creation_with_client_snippet() {
    let (server, _dir) = test_server().await;
    let issue = upload_issue(&server, "El Diario", 2).await;
    let id = issue["id"].as_str().unwrap();

    let data_url = format!("data:image/jpeg;base64,{}", "A".repeat(400));
    let created = server
        .post(&format!("/api/issues/{}/areas", id))
        .json(&json!({
            "pageNumber": 2,
            "coordinates": {"x": 5.0, "y": 5.0, "width": 30.0, "height": 10.0},
            "headline": "Late edition",
            "category": "local",
            "imageData": data_url,
        }))
        .await;
    created.assert_status(axum::http::StatusCode::CREATED);
    let created = created.json::<Value>();
    assert_eq!(created["extractedImageUrl"].as_str().unwrap(), data_url);

    // Zero-extent coordinates are rejected.
    let rejected = server
        .post(&format!("/api/issues/{}/areas", id))
        .json(&json!({
            "pageNumber": 1,
            "coordinates": {"x": 5.0, "y": 5.0, "width": 0.0, "height": 10.0},
        }))
        .await;
    rejected.assert_status(axum::http::StatusCode::BAD_REQUEST);

    // Coordinates starting past the page edge clamp to zero extent and are
    // rejected rather than persisted as a degenerate record.
    let off_page = server
        .post(&format!("/api/issues/{}/areas", id))
        .json(&json!({
            "pageNumber": 1,
            "coordinates": {"x": 150.0, "y": 5.0, "width": 10.0, "height": 10.0},
        }))
        .await;
    off_page.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let areas = server
        .get(&format!("/api/issues/{}/areas", id))
        .await
        .json::<Value>();
    assert_eq!(areas.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_issue_removes_areas() {
    let (server, _dir) = test_server().await;
    let issue = upload_issue(&server, "El Diario", 1).await;
    let id = issue["id"].as_str().unwrap();

    server
        .post(&format!("/api/issues/{}/areas", id))
        .json(&json!({
            "pageNumber": 1,
            "coordinates": {"x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0},
            "imageData": "data:image/jpeg;base64,stub",
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    server
        .delete(&format!("/api/issues/{}", id))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/issues/{}", id))
        .await
        .assert_status(axum::http::StatusCode::NOT_FOUND);
    server
        .get(&format!("/api/issues/{}/areas", id))
        .await
        .assert_status(axum::http::StatusCode::NOT_FOUND);
}
