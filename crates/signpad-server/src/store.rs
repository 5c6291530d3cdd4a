//! Requisition storage backends.

use crate::model::StoredRequisition;
use dashmap::DashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Requisition not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future returned by store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where accepted requisitions are kept.
pub trait RequisitionStore: Send + Sync {
    /// Insert or replace a record.
    fn save(&self, record: StoredRequisition) -> BoxFuture<'_, StoreResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StoreResult<StoredRequisition>>;

    /// All records, newest first.
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<StoredRequisition>>>;
}

fn newest_first(records: &mut [StoredRequisition]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.request_number.cmp(&a.request_number))
    });
}

/// In-memory store; contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, StoredRequisition>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequisitionStore for MemoryStore {
    fn save(&self, record: StoredRequisition) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.records.insert(record.id.clone(), record);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StoreResult<StoredRequisition>> {
        let id = id.to_string();
        Box::pin(async move {
            self.records
                .get(&id)
                .map(|r| r.value().clone())
                .ok_or(StoreError::NotFound(id))
        })
    }

    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<StoredRequisition>>> {
        Box::pin(async move {
            let mut records: Vec<_> = self.records.iter().map(|r| r.value().clone()).collect();
            newest_first(&mut records);
            Ok(records)
        })
    }
}

/// One JSON file per requisition in a directory.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)
            .map_err(|e| StoreError::Io(format!("Failed to create {}: {}", base_path.display(), e)))?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }
}

async fn read_record(path: &Path) -> StoreResult<StoredRequisition> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&json).map_err(|e| {
        StoreError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

impl RequisitionStore for FileStore {
    fn save(&self, record: StoredRequisition) -> BoxFuture<'_, StoreResult<()>> {
        let path = self.record_path(&record.id);
        Box::pin(async move {
            let json = serde_json::to_string_pretty(&record)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            tokio::fs::write(&path, json)
                .await
                .map_err(|e| StoreError::Io(format!("Failed to write {}: {}", path.display(), e)))
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StoreResult<StoredRequisition>> {
        let path = self.record_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Err(StoreError::NotFound(id));
            }
            read_record(&path).await
        })
    }

    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<StoredRequisition>>> {
        Box::pin(async move {
            let mut entries = tokio::fs::read_dir(&self.base_path)
                .await
                .map_err(|e| StoreError::Io(format!("Failed to read directory: {}", e)))?;

            let mut records = Vec::new();
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?
            {
                let path = entry.path();
                if path.extension().is_none_or(|ext| ext != "json") {
                    continue;
                }
                match read_record(&path).await {
                    Ok(record) => records.push(record),
                    Err(e) => tracing::warn!("Skipping unreadable record: {}", e),
                }
            }
            newest_first(&mut records);
            Ok(records)
        })
    }
}
