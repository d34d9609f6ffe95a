//! HTTP route handlers

pub mod issues;
pub mod mapper;

use crate::db::IssueRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Make sure an issue's PDF is loaded in the page cache, fetching the bytes
/// from the database on first use.
pub(crate) async fn ensure_loaded(state: &AppState, issue_id: &str) -> Result<()> {
    if state.pages().contains(issue_id).await {
        return Ok(());
    }

    let repo = IssueRepository::new(state.db());
    let data = repo
        .get_pdf_data(issue_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Issue not found: {}", issue_id)))?;

    state.pages().load_from_bytes(issue_id, data).await?;
    Ok(())
}
