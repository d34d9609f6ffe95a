//! Configuration management for the Hemeroteca server

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Scale used when no explicit scale is requested (1.0 = 72 DPI).
    pub default_scale: f32,
    /// Scale for the raster backing server-side snippet extraction.
    pub snippet_scale: f32,
    /// Rendered-page LRU cache capacity.
    pub page_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./hemeroteca.db".to_string(),
            },
            render: RenderConfig {
                default_scale: 1.5,
                snippet_scale: 2.0,
                page_cache_size: 100,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = RenderConfig {
            default_scale: 1.5,
            snippet_scale: 2.0,
            page_cache_size: 100,
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:./hemeroteca.db".to_string()),
            },
            render: RenderConfig {
                default_scale: env::var("RENDER_DEFAULT_SCALE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.default_scale),
                snippet_scale: env::var("RENDER_SNIPPET_SCALE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.snippet_scale),
                page_cache_size: env::var("RENDER_PAGE_CACHE_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.page_cache_size),
            },
        })
    }
}
