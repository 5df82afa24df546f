use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::MemoryStore;
use crate::error::BriefError;
use crate::types::ModelMessage;

/// JSON-file store: one file per thread, so history survives restarts.
///
/// # Example
/// ```no_run
/// use research_brief::memory::{FileMemoryStore, MemoryStore};
/// use research_brief::types::ModelMessage;
///
/// # async fn example() -> research_brief::error::Result<()> {
/// let store = FileMemoryStore::new_default();
/// store.append("default_thread", &[ModelMessage::user("hello")]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileMemoryStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ThreadFile {
    version: u32,
    thread_id: String,
    messages: Vec<ModelMessage>,
    updated_at: DateTime<Utc>,
}

impl FileMemoryStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store under `~/.research-brief/threads`.
    pub fn new_default() -> Self {
        Self::new(default_threads_dir())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn thread_path(&self, thread_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", encode_thread_id(thread_id)))
    }

    async fn read_thread(&self, path: &Path) -> Result<Option<ThreadFile>, BriefError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn get_history(&self, thread_id: &str) -> Result<Vec<ModelMessage>, BriefError> {
        let path = self.thread_path(thread_id);
        Ok(self
            .read_thread(&path)
            .await?
            .map(|file| file.messages)
            .unwrap_or_default())
    }

    async fn append(&self, thread_id: &str, messages: &[ModelMessage]) -> Result<(), BriefError> {
        if messages.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        let path = self.thread_path(thread_id);
        let mut file = self.read_thread(&path).await?.unwrap_or_else(|| ThreadFile {
            version: 1,
            thread_id: thread_id.to_string(),
            messages: Vec::new(),
            updated_at: Utc::now(),
        });
        file.messages.extend_from_slice(messages);
        file.updated_at = Utc::now();

        tokio::fs::create_dir_all(&self.base_dir).await?;
        // Unique per write: other stores on this directory may be mid-write.
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        let written = match tokio::fs::write(&tmp, serde_json::to_vec_pretty(&file)?).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }
}

fn default_threads_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".research-brief").join("threads"))
        .unwrap_or_else(|| PathBuf::from(".research-brief").join("threads"))
}

/// Injective, filesystem-safe encoding: ASCII alphanumerics and `-` pass
/// through, every other byte becomes `_XX`.
fn encode_thread_id(thread_id: &str) -> String {
    let mut out = String::with_capacity(thread_id.len());
    for byte in thread_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("_{byte:02x}"));
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}
