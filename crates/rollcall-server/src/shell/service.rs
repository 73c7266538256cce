//! [`ShellService`]: the gateway fronting one upstream origin with a
//! versioned asset cache.
//!
//! Lifecycle first, traffic second. [`ShellService::install`] fetches the
//! whole manifest into a staging generation and promotes it only when every
//! asset landed; [`ShellService::activate`] then sweeps stale generations.
//! After that, navigations are network-first with a cached-document
//! fallback, and assets are cache-first with opportunistic fill.

use std::{path::PathBuf, time::Duration};

use axum::{
  body::Body,
  http::{Method, StatusCode, header},
  response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::shell::{
  ShellError,
  manifest::{CACHE_TAG, LAST_RESORT_FALLBACK, SHELL_FALLBACK, SHELL_MANIFEST},
  storage::{CacheStorage, CachedAsset},
};

pub struct ShellService {
  storage:  CacheStorage,
  client:   reqwest::Client,
  origin:   String,
  tag:      String,
  manifest: Vec<String>,
}

impl ShellService {
  /// Build a gateway caching under `cache_root` for the given origin.
  ///
  /// `fetch_timeout` applies to every upstream request, install and traffic
  /// alike, so no path can hang on a dead upstream.
  pub fn new(
    cache_root: impl Into<PathBuf>,
    origin: impl Into<String>,
    fetch_timeout: Duration,
  ) -> Result<Self, ShellError> {
    let client = reqwest::Client::builder().timeout(fetch_timeout).build()?;
    Ok(Self {
      storage: CacheStorage::new(cache_root),
      client,
      origin: origin.into().trim_end_matches('/').to_owned(),
      tag: CACHE_TAG.to_owned(),
      manifest: SHELL_MANIFEST.iter().map(|url| (*url).to_owned()).collect(),
    })
  }

  /// Replace the default manifest. Tests point this at a local upstream.
  pub fn with_manifest(mut self, urls: Vec<String>) -> Self {
    self.manifest = urls;
    self
  }

  fn resolve(&self, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
      url.to_owned()
    } else {
      format!("{}{}", self.origin, url)
    }
  }

  async fn fetch(
    &self,
    url: &str,
  ) -> Result<(StatusCode, String, Bytes), ShellError> {
    let response = self.client.get(self.resolve(url)).send().await?;
    let status = response.status();
    let content_type = response
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .unwrap_or("application/octet-stream")
      .to_owned();
    let body = response.bytes().await?;
    Ok((status, content_type, body))
  }

  // ─── Lifecycle ─────────────────────────────────────────────────────────────

  /// Fetch and store the full manifest, all or nothing.
  ///
  /// Assets land in a staging generation that is promoted to the live tag
  /// only after the last one succeeds. Any failure removes the staging
  /// directory and returns the error; whatever generation was serving before
  /// keeps serving.
  pub async fn install(&self) -> Result<(), ShellError> {
    let staging = format!("{}.staging", self.tag);
    self.storage.remove_generation(&staging).await?;

    for url in &self.manifest {
      if let Err(e) = self.install_one(&staging, url).await {
        tracing::warn!(url = %url, error = %e, "shell install aborted");
        self.storage.remove_generation(&staging).await?;
        return Err(e);
      }
    }

    self.storage.promote(&staging, &self.tag).await?;
    tracing::info!(
      tag = %self.tag,
      assets = self.manifest.len(),
      "shell cache installed"
    );
    Ok(())
  }

  async fn install_one(&self, tag: &str, url: &str) -> Result<(), ShellError> {
    let (status, content_type, body) = self.fetch(url).await?;
    if !status.is_success() {
      return Err(ShellError::UpstreamStatus {
        url:    url.to_owned(),
        status: status.as_u16(),
      });
    }
    self.storage.put(tag, url, &content_type, &body).await?;
    tracing::debug!(url = %url, bytes = body.len(), "shell asset cached");
    Ok(())
  }

  /// Delete every cache generation other than the live tag, returning the
  /// removed names. Call only after a successful [`Self::install`].
  pub async fn activate(&self) -> Result<Vec<String>, ShellError> {
    let removed = self.storage.sweep_stale(&self.tag).await?;
    for name in &removed {
      tracing::info!(cache = %name, "stale shell cache removed");
    }
    Ok(removed)
  }

  // ─── Request policies ──────────────────────────────────────────────────────

  /// Network-first policy for page navigations.
  ///
  /// A reachable upstream answers as-is, success or not; only a failed fetch
  /// falls back to the cached shell document.
  pub async fn serve_navigation(&self, path: &str) -> Response {
    match self.fetch(path).await {
      Ok((status, content_type, body)) => proxied(status, &content_type, body),
      Err(e) => {
        tracing::warn!(
          path = %path,
          error = %e,
          "navigation fetch failed, serving cached shell"
        );
        self.cached_fallback(SHELL_FALLBACK).await
      }
    }
  }

  /// Cache-first policy for asset requests.
  ///
  /// Hits are served straight from disk with an ETag. Misses go upstream,
  /// and a 200 response to a GET is stored opportunistically on the way
  /// through. A failed fetch falls back to the cached root document.
  pub async fn serve_asset(
    &self,
    method: &Method,
    path_query: &str,
  ) -> Response {
    if *method != Method::GET {
      return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    match self.storage.get(&self.tag, path_query).await {
      Ok(Some(asset)) => return cached(asset),
      Ok(None) => {}
      Err(e) => {
        tracing::warn!(path = %path_query, error = %e, "cache read failed")
      }
    }

    match self.fetch(path_query).await {
      Ok((status, content_type, body)) => {
        if status == StatusCode::OK {
          if let Err(e) = self
            .storage
            .put(&self.tag, path_query, &content_type, &body)
            .await
          {
            tracing::warn!(
            path = %path_query,
            error = %e,
            "opportunistic cache write failed"
          );
          }
        }
        proxied(status, &content_type, body)
      }
      Err(e) => {
        tracing::warn!(
          path = %path_query,
          error = %e,
          "asset fetch failed, serving cached shell"
        );
        self.cached_fallback(LAST_RESORT_FALLBACK).await
      }
    }
  }

  /// Serve a cached document, or 503 when nothing was ever installed.
  async fn cached_fallback(&self, path: &str) -> Response {
    match self.storage.get(&self.tag, path).await {
      Ok(Some(asset)) => cached(asset),
      Ok(None) => offline_unavailable(),
      Err(e) => {
        tracing::error!(path = %path, error = %e, "cached shell read failed");
        offline_unavailable()
      }
    }
  }
}

fn offline_unavailable() -> Response {
  (StatusCode::SERVICE_UNAVAILABLE, "offline and no cached shell")
    .into_response()
}

fn proxied(status: StatusCode, content_type: &str, body: Bytes) -> Response {
  Response::builder()
    .status(status)
    .header(header::CONTENT_TYPE, content_type)
    .body(Body::from(body))
    .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}

fn cached(asset: CachedAsset) -> Response {
  Response::builder()
    .status(StatusCode::OK)
    .header(header::CONTENT_TYPE, asset.content_type.as_str())
    .header(header::ETAG, asset.etag.as_str())
    .body(Body::from(asset.body))
    .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
