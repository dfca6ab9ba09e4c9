//! Filesystem-backed cache store
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/index.json          key -> archive, written-at timestamp
//! <root>/<digest>.tar        one archive per key
//! ```
//!
//! Keys contain `/` (from the date), so archives are named by a SHA256
//! digest of the key instead of the key itself.

use crate::cache::key::date_after_prefix;
use crate::cache::store::{CacheStore, StoreMatch};
use crate::error::{JitcacheError, JitcacheResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const INDEX_FILE: &str = "index.json";

/// One stored archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub key: String,
    /// Archive file name, relative to the store root
    pub archive: String,
    pub created_at: DateTime<Utc>,
}

/// Cache store on the local filesystem
pub struct LocalStore {
    root: PathBuf,
    target: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root` that restores into `target`
    pub fn new(root: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            target: target.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Read the index; a missing store or index is an empty store
    pub async fn entries(&self) -> JitcacheResult<Vec<IndexEntry>> {
        let path = self.index_path();
        if !path.exists() {
            debug!("No store index at {}", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| JitcacheError::StoreUnavailable {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        serde_json::from_str(&content).map_err(|e| JitcacheError::StoreIndex {
            path,
            reason: e.to_string(),
        })
    }

    async fn write_entries(&self, entries: &[IndexEntry]) -> JitcacheResult<()> {
        let path = self.index_path();
        let tmp = self.root.join(format!("{INDEX_FILE}.tmp"));
        let content = serde_json::to_string_pretty(entries)?;

        fs::write(&tmp, content)
            .await
            .map_err(|e| JitcacheError::io(format!("writing {}", tmp.display()), e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| JitcacheError::io(format!("replacing {}", path.display()), e))
    }

    /// Archive `source` and store it under `key`, replacing any previous entry
    pub async fn save(&self, key: &str, source: &Path) -> JitcacheResult<IndexEntry> {
        self.save_at(key, source, Utc::now()).await
    }

    async fn save_at(
        &self,
        key: &str,
        source: &Path,
        created_at: DateTime<Utc>,
    ) -> JitcacheResult<IndexEntry> {
        if !source.is_dir() {
            return Err(JitcacheError::NothingToSave(source.to_path_buf()));
        }

        fs::create_dir_all(&self.root).await.map_err(|e| {
            JitcacheError::io(format!("creating store {}", self.root.display()), e)
        })?;

        let entry = IndexEntry {
            key: key.to_string(),
            archive: archive_name(key),
            created_at,
        };

        let archive_path = self.root.join(&entry.archive);
        let source = source.to_path_buf();
        let owned_key = key.to_string();
        run_blocking(key, move || write_archive(&archive_path, &source))
            .await
            .map_err(|reason| JitcacheError::Archive {
                key: owned_key,
                reason,
            })?;

        let mut entries = self.entries().await?;
        entries.retain(|e| e.key != key);
        entries.push(entry.clone());
        self.write_entries(&entries).await?;

        info!("Saved cache {} ({})", entry.key, entry.archive);
        Ok(entry)
    }
}

#[async_trait]
impl CacheStore for LocalStore {
    async fn lookup(
        &self,
        primary_key: &str,
        fallback_prefixes: &[String],
    ) -> JitcacheResult<Option<StoreMatch>> {
        let entries = self.entries().await?;
        let Some(entry) = select_entry(&entries, primary_key, fallback_prefixes) else {
            return Ok(None);
        };
        let entry = entry.clone();

        debug!("Restoring {} into {}", entry.key, self.target.display());

        let archive_path = self.root.join(&entry.archive);
        let target = self.target.clone();
        run_blocking(&entry.key, move || unpack_archive(&archive_path, &target))
            .await
            .map_err(|reason| JitcacheError::Archive {
                key: entry.key.clone(),
                reason,
            })?;

        Ok(Some(StoreMatch {
            key: entry.key,
            materialized: true,
        }))
    }

    fn store_name(&self) -> &'static str {
        "local"
    }
}

/// Pick the entry a lookup should return
///
/// Exact match first, then each prefix in order; among entries sharing a
/// prefix the newest wins, with later index position breaking ties. A
/// prefix only matches keys that continue with nothing but a date.
pub fn select_entry<'a>(
    entries: &'a [IndexEntry],
    primary_key: &str,
    fallback_prefixes: &[String],
) -> Option<&'a IndexEntry> {
    if let Some(exact) = entries.iter().find(|e| e.key == primary_key) {
        return Some(exact);
    }

    fallback_prefixes.iter().find_map(|prefix| {
        entries
            .iter()
            .filter(|e| date_after_prefix(&e.key, prefix).is_some())
            .max_by_key(|e| e.created_at)
    })
}

/// Archive file name for a key: first 16 hex chars of its SHA256
fn archive_name(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{}.tar", hex::encode(&digest[..8]))
}

async fn run_blocking<F>(key: &str, f: F) -> Result<(), String>
where
    F: FnOnce() -> std::io::Result<()> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(format!("archive task for {key} failed: {e}")),
    }
}

fn write_archive(archive_path: &Path, source: &Path) -> std::io::Result<()> {
    let file = File::create(archive_path)?;
    let mut builder = tar::Builder::new(file);
    builder.append_dir_all(".", source)?;
    builder.into_inner()?.sync_all()
}

/// Unpack into a staging directory beside `target`, then swap it in
///
/// A failed unpack leaves `target` as it was.
fn unpack_archive(archive_path: &Path, target: &Path) -> std::io::Result<()> {
    let staging = staging_dir(target);
    if staging.exists() {
        std::fs::remove_dir_all(&staging)?;
    }
    std::fs::create_dir_all(&staging)?;

    let unpacked =
        File::open(archive_path).and_then(|file| tar::Archive::new(file).unpack(&staging));
    if let Err(e) = unpacked {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(e);
    }

    if target.exists() {
        std::fs::remove_dir_all(target)?;
    }
    std::fs::rename(&staging, target)
}

fn staging_dir(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cache".to_string());
    target.with_file_name(format!(".{name}.restoring"))
}
