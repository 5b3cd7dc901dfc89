use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::error;

use missive_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub author_policy: AuthorPolicy,
}

impl AppStateInner {
    pub fn new(db: Database, author_policy: AuthorPolicy) -> AppState {
        Arc::new(Self { db, author_policy })
    }
}

/// When message creation checks that the author exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorPolicy {
    /// Write the message first, then look up the author. A missing author is
    /// a 500 and the message stays persisted without a back-reference.
    #[default]
    Legacy,
    /// Reject an unknown author with a 400 before anything is written.
    Strict,
}

impl FromStr for AuthorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown author policy '{}' (expected 'legacy' or 'strict')", other)),
        }
    }
}

impl fmt::Display for AuthorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Run a blocking DB call off the async runtime.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}
