//! Mapped-area types
//!
//! A mapped area tags a rectangular region of a newspaper page with a
//! headline, a category and an optional cropped image snippet. Coordinates
//! are stored in percentage-of-page space so they re-project onto any
//! rendered size.

use serde::{Deserialize, Serialize};

use crate::geometry::PercentRect;

/// News category for a mapped area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    Sports,
    Business,
    Entertainment,
    Local,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::Sports => "sports",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Local => "local",
            Category::Other => "other",
        }
    }

    /// Parse a stored category, falling back to `Other` for unknown values.
    pub fn parse_or_other(s: &str) -> Self {
        match s {
            "politics" => Category::Politics,
            "sports" => Category::Sports,
            "business" => Category::Business,
            "entertainment" => Category::Entertainment,
            "local" => Category::Local,
            _ => Category::Other,
        }
    }
}

/// A persisted article region on a newspaper page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedArea {
    /// Page the area belongs to (1-indexed).
    pub page_number: u32,
    /// Region in percentage-of-page space (each field 0-100).
    pub coordinates: PercentRect,
    /// Free-text label; may be empty.
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub category: Category,
    /// Self-contained encoded snippet (`data:` URL), if one was captured.
    #[serde(default)]
    pub extracted_image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for cat in [
            Category::Politics,
            Category::Sports,
            Category::Business,
            Category::Entertainment,
            Category::Local,
            Category::Other,
        ] {
            assert_eq!(Category::parse_or_other(cat.as_str()), cat);
        }
    }

    #[test]
    fn test_category_unknown_falls_back() {
        assert_eq!(Category::parse_or_other("weather"), Category::Other);
        assert_eq!(Category::parse_or_other(""), Category::Other);
    }

    #[test]
    fn test_wire_shape() {
        let area = MappedArea {
            page_number: 2,
            coordinates: PercentRect {
                x: 10.0,
                y: 3.5,
                width: 20.0,
                height: 7.0,
            },
            headline: "Budget 2024".to_string(),
            category: Category::Business,
            extracted_image_url: None,
        };

        let json = serde_json::to_value(&area).unwrap();
        assert_eq!(json["pageNumber"], 2);
        assert_eq!(json["coordinates"]["x"], 10.0);
        assert_eq!(json["category"], "business");
        assert!(json["extractedImageUrl"].is_null());

        let parsed: MappedArea = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.page_number, 2);
        assert_eq!(parsed.category, Category::Business);
    }
}
