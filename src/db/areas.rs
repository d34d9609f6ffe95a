//! Mapped article area database operations

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::geometry::PercentRect;
use crate::mapper::{Category, MappedArea};

/// Flat row as stored (coordinates are four REAL columns)
#[derive(Debug, Clone, sqlx::FromRow)]
struct AreaRow {
    id: String,
    issue_id: String,
    page_number: i64,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    headline: String,
    category: String,
    extracted_image_url: Option<String>,
    created_at: String,
}

/// Persisted mapped area with its identity and ownership
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredArea {
    pub id: String,
    pub issue_id: String,
    pub created_at: String,
    #[serde(flatten)]
    pub area: MappedArea,
}

impl From<AreaRow> for StoredArea {
    fn from(row: AreaRow) -> Self {
        StoredArea {
            id: row.id,
            issue_id: row.issue_id,
            created_at: row.created_at,
            area: MappedArea {
                page_number: row.page_number as u32,
                coordinates: PercentRect {
                    x: row.x,
                    y: row.y,
                    width: row.width,
                    height: row.height,
                },
                headline: row.headline,
                category: Category::parse_or_other(&row.category),
                extracted_image_url: row.extracted_image_url,
            },
        }
    }
}

const AREA_COLUMNS: &str = "id, issue_id, page_number, x, y, width, height, \
     headline, category, extracted_image_url, created_at";

/// Mapped area repository
pub struct AreaRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AreaRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a mapped area for an issue
    pub async fn create(&self, issue_id: &str, area: &MappedArea) -> Result<StoredArea> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO mapped_areas (id, issue_id, page_number, x, y, width, height,
                                      headline, category, extracted_image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(issue_id)
        .bind(area.page_number as i64)
        .bind(area.coordinates.x)
        .bind(area.coordinates.y)
        .bind(area.coordinates.width)
        .bind(area.coordinates.height)
        .bind(&area.headline)
        .bind(area.category.as_str())
        .bind(&area.extracted_image_url)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(&id).await?.ok_or_else(|| {
            crate::error::AppError::Internal("Failed to fetch created area".to_string())
        })
    }

    /// Get a single area
    pub async fn get(&self, id: &str) -> Result<Option<StoredArea>> {
        let row = sqlx::query_as::<_, AreaRow>(&format!(
            "SELECT {AREA_COLUMNS} FROM mapped_areas WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(StoredArea::from))
    }

    /// All areas for an issue, in insertion order (stacking order for hotspots)
    pub async fn list_for_issue(&self, issue_id: &str) -> Result<Vec<StoredArea>> {
        let rows = sqlx::query_as::<_, AreaRow>(&format!(
            "SELECT {AREA_COLUMNS} FROM mapped_areas WHERE issue_id = ? ORDER BY rowid ASC"
        ))
        .bind(issue_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredArea::from).collect())
    }
}
