//! Shared application state

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::Config;
use crate::mapper::EditorSession;
use crate::pdf::PageCache;

/// Shared application state, cheap to clone into handlers
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    pages: PageCache,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<EditorSession>>>>,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let pages = PageCache::new(config.render.page_cache_size);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                pages,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    pub fn pages(&self) -> &PageCache {
        &self.inner.pages
    }

    /// Register a new mapping session, returning its id
    pub async fn open_session(&self, session: EditorSession) -> Uuid {
        let id = Uuid::new_v4();
        self.inner
            .sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    /// Look up a mapping session by id
    pub async fn session(&self, id: &Uuid) -> Option<Arc<Mutex<EditorSession>>> {
        self.inner.sessions.read().await.get(id).cloned()
    }

    /// Remove a mapping session; returns whether one existed
    pub async fn close_session(&self, id: &Uuid) -> bool {
        self.inner.sessions.write().await.remove(id).is_some()
    }
}
