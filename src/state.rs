//! Application state shared by all handlers.

use std::sync::Arc;

use crate::agent::StudyAgent;
use crate::db::DbPool;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection
    pub pool: DbPool,

    /// Session generation and recommendations
    pub agent: Arc<StudyAgent>,
}

impl AppState {
    pub fn new(pool: DbPool, agent: StudyAgent) -> Self {
        Self {
            pool,
            agent: Arc::new(agent),
        }
    }
}
