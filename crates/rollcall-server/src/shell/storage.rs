//! On-disk cache storage: one directory per cache generation, one entry pair
//! (body plus metadata sidecar) per URL.
//!
//! Entry file names are the sha256 of the URL, so any URL — path, query
//! string, absolute CDN address — maps to a flat, filesystem-safe name.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::shell::ShellError;

/// Metadata sidecar stored beside each cached body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
  pub url:          String,
  pub content_type: String,
  pub cached_at:    DateTime<Utc>,
}

/// A cache entry read back from disk.
#[derive(Debug, Clone)]
pub struct CachedAsset {
  pub body:         Bytes,
  pub content_type: String,
  /// Strong ETag: quoted hex sha256 of the body bytes.
  pub etag:         String,
}

/// Generation-versioned cache storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct CacheStorage {
  root: PathBuf,
}

impl CacheStorage {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  fn generation_dir(&self, tag: &str) -> PathBuf {
    self.root.join(tag)
  }

  fn entry_stem(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
  }

  /// Store `body` as the entry for `url` under generation `tag`.
  ///
  /// Both files are written to a temporary path and renamed into place, so a
  /// concurrent reader sees either the old entry or the new one, never a
  /// torn write.
  pub async fn put(
    &self,
    tag: &str,
    url: &str,
    content_type: &str,
    body: &[u8],
  ) -> Result<(), ShellError> {
    let dir = self.generation_dir(tag);
    tokio::fs::create_dir_all(&dir).await?;

    let stem = Self::entry_stem(url);

    let tmp = dir.join(format!("{stem}.body.tmp"));
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, dir.join(&stem)).await?;

    let meta = EntryMeta {
      url:          url.to_owned(),
      content_type: content_type.to_owned(),
      cached_at:    Utc::now(),
    };
    let tmp = dir.join(format!("{stem}.meta.tmp"));
    tokio::fs::write(&tmp, serde_json::to_vec(&meta)?).await?;
    tokio::fs::rename(&tmp, dir.join(format!("{stem}.meta.json"))).await?;
    Ok(())
  }

  /// Read back the entry for `url` under generation `tag`, if present.
  pub async fn get(
    &self,
    tag: &str,
    url: &str,
  ) -> Result<Option<CachedAsset>, ShellError> {
    let dir = self.generation_dir(tag);
    let stem = Self::entry_stem(url);

    let meta_path = dir.join(format!("{stem}.meta.json"));
    let raw_meta = match tokio::fs::read(meta_path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    let meta: EntryMeta = serde_json::from_slice(&raw_meta)?;

    let body = match tokio::fs::read(dir.join(&stem)).await {
      Ok(body) => body,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };

    let etag = format!("\"{}\"", hex::encode(Sha256::digest(&body)));
    Ok(Some(CachedAsset {
      body:         Bytes::from(body),
      content_type: meta.content_type,
      etag,
    }))
  }

  /// Remove one generation entirely. A missing directory is not an error.
  pub async fn remove_generation(&self, tag: &str) -> Result<(), ShellError> {
    match tokio::fs::remove_dir_all(self.generation_dir(tag)).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }

  /// Promote one generation directory to another name, replacing whatever
  /// directory previously held the target name.
  pub async fn promote(&self, from: &str, to: &str) -> Result<(), ShellError> {
    self.remove_generation(to).await?;
    tokio::fs::rename(self.generation_dir(from), self.generation_dir(to)).await?;
    Ok(())
  }

  /// Delete every generation directory except `keep`, returning the removed
  /// names. A sweep with nothing stale removes nothing.
  pub async fn sweep_stale(&self, keep: &str) -> Result<Vec<String>, ShellError> {
    let mut removed = Vec::new();
    let mut entries = match tokio::fs::read_dir(&self.root).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
      Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
      if !entry.file_type().await?.is_dir() {
        continue;
      }
      let name = entry.file_name().to_string_lossy().into_owned();
      if name != keep {
        tokio::fs::remove_dir_all(entry.path()).await?;
        removed.push(name);
      }
    }
    Ok(removed)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}
