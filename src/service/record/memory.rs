//! In-memory record store, used by tests and single-shot runs.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::base::types::{Res, Void};

use super::{GenericRecordStore, RecordDocument};

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    document: Mutex<RecordDocument>,
}

#[async_trait]
impl GenericRecordStore for MemoryRecordStore {
    async fn load_document(&self) -> Res<RecordDocument> {
        let document = self.document.lock().map_err(|_| anyhow::anyhow!("Record store lock poisoned."))?;

        Ok(document.clone())
    }

    async fn persist_document(&self, document: &RecordDocument) -> Void {
        let mut stored = self.document.lock().map_err(|_| anyhow::anyhow!("Record store lock poisoned."))?;
        *stored = document.clone();

        Ok(())
    }
}
