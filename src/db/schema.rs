//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Newspaper issues
CREATE TABLE IF NOT EXISTS issues (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    issue_date TEXT,
    pdf_data BLOB NOT NULL,
    page_count INTEGER NOT NULL,
    is_published INTEGER NOT NULL DEFAULT 0,
    published_at TEXT,
    view_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_issues_published ON issues(is_published);
CREATE INDEX IF NOT EXISTS idx_issues_date ON issues(issue_date);

-- Mapped article areas (append-only; removed with the parent issue)
CREATE TABLE IF NOT EXISTS mapped_areas (
    id TEXT PRIMARY KEY,
    issue_id TEXT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    -- Page number, 1-indexed
    page_number INTEGER NOT NULL,
    -- Region in percentage-of-page space (0-100)
    x REAL NOT NULL,
    y REAL NOT NULL,
    width REAL NOT NULL,
    height REAL NOT NULL,
    headline TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT 'other',
    -- Cropped snippet as a data: URL
    extracted_image_url TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_areas_issue ON mapped_areas(issue_id);
CREATE INDEX IF NOT EXISTS idx_areas_issue_page ON mapped_areas(issue_id, page_number);
"#;
