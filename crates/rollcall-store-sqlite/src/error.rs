//! Error types for `rollcall-store-sqlite`.

use thiserror::Error;

/// An error that can occur when using the SQLite-backed store.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] rollcall_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("stored document is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
