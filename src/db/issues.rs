//! Issue (newspaper) database operations

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;

/// Issue record (PDF bytes are fetched separately; they are large)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub issue_date: Option<String>,
    pub page_count: i64,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub view_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Create issue request
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub issue_date: Option<String>,
    pub page_count: u32,
    pub pdf_data: Vec<u8>,
}

const ISSUE_COLUMNS: &str = "id, title, description, issue_date, page_count, \
     is_published, published_at, view_count, created_at, updated_at";

/// Issue repository
pub struct IssueRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> IssueRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific issue (without PDF bytes)
    pub async fn get(&self, id: &str) -> Result<Option<Issue>> {
        let issue = sqlx::query_as::<_, Issue>(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(issue)
    }

    /// Get the stored PDF bytes for an issue
    pub async fn get_pdf_data(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let data: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT pdf_data FROM issues WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(data)
    }

    /// List all issues, newest first (admin view)
    pub async fn list_all(&self) -> Result<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues ORDER BY issue_date DESC, created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(issues)
    }

    /// List published issues, newest first (reader gallery)
    pub async fn list_published(&self) -> Result<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE is_published = 1 \
             ORDER BY issue_date DESC, created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(issues)
    }

    /// Create a new issue
    pub async fn create(&self, data: NewIssue) -> Result<Issue> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO issues (id, title, description, issue_date, pdf_data, page_count,
                                is_published, view_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, 0, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.issue_date)
        .bind(&data.pdf_data)
        .bind(data.page_count as i64)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(&id).await?.ok_or_else(|| {
            crate::error::AppError::Internal("Failed to fetch created issue".to_string())
        })
    }

    /// Flip the published flag; stamps `published_at` on first publish.
    pub async fn toggle_publish(&self, id: &str) -> Result<Option<Issue>> {
        let Some(issue) = self.get(id).await? else {
            return Ok(None);
        };

        let now = Utc::now().to_rfc3339();
        let publishing = !issue.is_published;
        let published_at = if publishing && issue.published_at.is_none() {
            Some(now.clone())
        } else {
            issue.published_at.clone()
        };

        sqlx::query(
            "UPDATE issues SET is_published = ?, published_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(publishing)
        .bind(&published_at)
        .bind(&now)
        .bind(id)
        .execute(self.pool)
        .await?;

        self.get(id).await
    }

    /// Delete an issue and its mapped areas
    pub async fn delete(&self, id: &str) -> Result<bool> {
        sqlx::query("DELETE FROM mapped_areas WHERE issue_id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM issues WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Best-effort view counter
    pub async fn increment_view_count(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE issues SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
