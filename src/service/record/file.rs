//! JSON file record store.
//!
//! The whole document is rewritten on every persist. Writes go to a sibling
//! temporary file that is then renamed over the target, so readers never see a
//! half-written document.

use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::base::types::{Res, Void};

use super::{GenericRecordStore, RecordDocument};

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// A sibling path no other writer uses, in this process or another one.
    fn temp_path(&self) -> PathBuf {
        let name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or("record");
        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);

        self.path.with_file_name(format!(".{name}.tmp-{}-{stamp}-{sequence}", std::process::id()))
    }
}

#[async_trait]
impl GenericRecordStore for FileRecordStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load_document(&self) -> Res<RecordDocument> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Record file does not exist yet.");
                return Ok(RecordDocument::default());
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read record file `{}`", self.path.display())),
        };

        let document: RecordDocument = serde_json::from_str(&contents).with_context(|| format!("Record file `{}` is corrupt", self.path.display()))?;

        debug!("Loaded {} record(s).", document.records.len());

        Ok(document)
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn persist_document(&self, document: &RecordDocument) -> Void {
        let contents = serde_json::to_string(document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.with_context(|| format!("Failed to create `{}`", parent.display()))?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, contents).await.with_context(|| format!("Failed to write `{}`", temp_path.display()))?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e).with_context(|| format!("Failed to replace `{}`", self.path.display()));
        }

        debug!("Stored {} record(s).", document.records.len());

        Ok(())
    }
}

// Tests.
