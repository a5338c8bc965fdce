use std::sync::Arc;

use sqlx::SqlitePool;

use crate::realtime::Gateway;

/// Shared application state handed to every handler and the websocket layer.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            gateway: Arc::new(Gateway::new()),
        }
    }
}
