//! Hemeroteca server library
//!
//! Self-hosted newspaper archive: PDF issues are uploaded and rendered
//! page by page, administrators map article regions by drawing rectangles
//! over the rendered pages, and readers get clickable hotspots projected
//! back onto whatever size they view the page at.

pub mod config;
pub mod db;
pub mod error;
pub mod geometry;
pub mod mapper;
pub mod pdf;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
