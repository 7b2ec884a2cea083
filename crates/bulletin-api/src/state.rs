use std::sync::Arc;

use anyhow::anyhow;
use tracing::error;

use bulletin_db::Database;

use crate::diagnostics::Diagnostics;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Set once at startup; handlers and the timing layer only read it.
    pub diagnostics: Diagnostics,
}

impl AppStateInner {
    pub fn new(db: Database, diagnostics: Diagnostics) -> AppState {
        Arc::new(Self { db, diagnostics })
    }
}

/// Runs a blocking store call off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow!("store task failed: {}", e)
        })?
}
