// Append-only metrics history on a JSON Lines file.
// Writes are serialized behind one async lock; reads clone an Arc of the
// in-memory entries and never touch the disk.

mod codec;

use crate::models::{Snapshot, SnapshotError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::io::AsyncWriteExt;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Malformed(#[from] SnapshotError),
    #[error("history encode: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("history write: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Default)]
struct WriterState {
    /// The file on disk could not be decoded; the next append replaces it.
    needs_rewrite: bool,
    /// The last record on disk has no trailing newline.
    needs_newline: bool,
}

pub struct HistoryRepo {
    path: PathBuf,
    writer: tokio::sync::Mutex<WriterState>,
    entries: RwLock<Arc<Vec<Snapshot>>>,
}

impl HistoryRepo {
    /// Opens (or lazily creates) the log at `path`. An unreadable or corrupt
    /// log opens as an empty history.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let (entries, state) = load_log(&path).await;
        tracing::debug!(
            path = %path.display(),
            entries = entries.len(),
            "history opened"
        );
        Ok(Self {
            path,
            writer: tokio::sync::Mutex::new(state),
            entries: RwLock::new(Arc::new(entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one snapshot and flushes it to disk before returning.
    #[instrument(skip(self, snapshot), fields(repo = "history", operation = "append"))]
    pub async fn append(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        snapshot.validate()?;
        let mut writer = self.writer.lock().await;

        if writer.needs_rewrite {
            let mut all = self.current().as_ref().clone();
            all.push(snapshot.clone());
            rewrite_log(&self.path, &all).await?;
            *writer = WriterState::default();
            tracing::info!(
                path = %self.path.display(),
                entries = all.len(),
                "history log rewritten"
            );
        } else {
            let mut line = codec::encode_line(&snapshot)?;
            if writer.needs_newline {
                line.insert(0, '\n');
            }
            if let Err(e) = append_line(&self.path, &line).await {
                // A partial write may have left a fragment; rebuild from memory next time.
                writer.needs_rewrite = true;
                return Err(e.into());
            }
            writer.needs_newline = false;
        }

        {
            let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
            Arc::make_mut(&mut *guard).push(snapshot);
        }
        Ok(())
    }

    /// The last `limit` snapshots, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Snapshot> {
        let entries = self.current();
        let start = entries.len().saturating_sub(limit);
        entries[start..].to_vec()
    }

    /// The newest snapshot and up to `limit` snapshots preceding it (oldest first).
    pub fn latest_with_window(&self, limit: usize) -> Option<(Snapshot, Vec<Snapshot>)> {
        let entries = self.current();
        let (latest, before) = entries.split_last()?;
        let start = before.len().saturating_sub(limit);
        Some((latest.clone(), before[start..].to_vec()))
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-reads the log from disk, e.g. after it was truncated externally.
    #[instrument(skip(self), fields(repo = "history", operation = "reload"))]
    pub async fn reload(&self) {
        let mut writer = self.writer.lock().await;
        let (entries, state) = load_log(&self.path).await;
        *writer = state;
        *self.entries.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(entries);
    }

    fn current(&self) -> Arc<Vec<Snapshot>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Returns the decoded entries and how the next append must treat the file.
async fn load_log(path: &Path) -> (Vec<Snapshot>, WriterState) {
    let corrupt = WriterState {
        needs_rewrite: true,
        needs_newline: false,
    };
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return (Vec::new(), WriterState::default());
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                operation = "load_history",
                "history unreadable, starting empty"
            );
            return (Vec::new(), corrupt);
        }
    };
    match codec::decode_log(&content) {
        Ok(entries) => {
            let state = WriterState {
                needs_rewrite: false,
                needs_newline: !content.is_empty() && !content.ends_with('\n'),
            };
            (entries, state)
        }
        Err(e) => {
            tracing::warn!(
                line = e.line,
                error = %e.reason,
                path = %path.display(),
                operation = "load_history",
                "history corrupt, starting empty"
            );
            (Vec::new(), corrupt)
        }
    }
}

async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.sync_data().await
}

/// Write-then-rename so a crash never leaves a half-written log behind.
async fn rewrite_log(path: &Path, snapshots: &[Snapshot]) -> Result<(), StoreError> {
    let content = codec::encode_log(snapshots)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(content.as_bytes()).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
