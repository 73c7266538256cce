//! The offline shell gateway: a versioned asset cache with an
//! install/activate lifecycle and the two request policies the application
//! shell relies on (network-first navigations, cache-first assets).

pub mod manifest;
pub mod service;
pub mod storage;

use thiserror::Error;

pub use self::{
  service::ShellService,
  storage::{CacheStorage, CachedAsset},
};

/// A failure inside the shell gateway.
///
/// Request paths never surface these to clients; they degrade to fallback
/// responses and a log line. Lifecycle callers decide whether to abort.
#[derive(Debug, Error)]
pub enum ShellError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("upstream error: {0}")]
  Upstream(#[from] reqwest::Error),

  #[error("upstream returned {status} for {url}")]
  UpstreamStatus { url: String, status: u16 },

  #[error("cache metadata error: {0}")]
  Meta(#[from] serde_json::Error),
}
