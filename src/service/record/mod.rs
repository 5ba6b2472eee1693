//! Review request records used to avoid pinging the same reviewer twice.
//!
//! A record maps a pull request id to the reviewers that were requested last
//! time and when. Records older than the freshness window are treated as absent
//! when queried and are dropped when the records are persisted.
//!
//! The lifecycle per inbound event is `load` -> `query`/`insert` -> `persist`.
//! Within the process, callers hold [`RecordClient::lock`] across that
//! sequence. Two processes sharing one backing file can still race; the last
//! writer wins and the loser's record is lost, which can cause at most one
//! duplicate ping.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::base::{
    config::Config,
    types::{Res, Void},
};

pub mod file;
pub mod memory;

// Data types.

/// The reviewers requested on one pull request and when they were recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub reviewers: Vec<String>,
    #[serde(with = "datetime_format")]
    pub datetime: DateTime<Utc>,
}

/// The persisted shape of the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDocument {
    #[serde(default)]
    pub records: BTreeMap<String, RecordEntry>,
}

/// The loaded records, together with the freshness window that applies to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRecords {
    entries: BTreeMap<String, RecordEntry>,
    window: Duration,
}

impl NotifyRecords {
    pub fn new(document: RecordDocument, window: Duration) -> Self {
        Self { entries: document.records, window }
    }

    /// All entries, fresh or not.
    pub fn entries(&self) -> &BTreeMap<String, RecordEntry> {
        &self.entries
    }

    /// Reviewers previously recorded for the pull request, or nothing if the record is stale.
    pub fn query(&self, pr_id: &str) -> Vec<String> {
        self.query_at(pr_id, Utc::now())
    }

    pub fn query_at(&self, pr_id: &str, now: DateTime<Utc>) -> Vec<String> {
        match self.entries.get(pr_id) {
            Some(entry) if self.is_fresh(entry, now) => entry.reviewers.clone(),
            _ => Vec::new(),
        }
    }

    /// Replace the record of the pull request with the given reviewers, stamped now.
    pub fn insert(&mut self, pr_id: &str, reviewers: Vec<String>) {
        self.insert_at(pr_id, reviewers, Utc::now());
    }

    pub fn insert_at(&mut self, pr_id: &str, reviewers: Vec<String>, now: DateTime<Utc>) {
        self.entries.insert(pr_id.to_string(), RecordEntry { reviewers, datetime: now });
    }

    /// Drop every record that is older than the window.
    pub fn retain_fresh(&mut self, now: DateTime<Utc>) {
        let window = self.window;
        self.entries.retain(|_, entry| now.signed_duration_since(entry.datetime) < window);
    }

    fn is_fresh(&self, entry: &RecordEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.datetime) < self.window
    }

    fn to_document(&self) -> RecordDocument {
        RecordDocument { records: self.entries.clone() }
    }
}

// Traits.

/// Generic record backend trait that stores must implement.
///
/// Backends only move whole documents; freshness is handled by [`RecordClient`].
#[async_trait]
pub trait GenericRecordStore: Send + Sync + 'static {
    /// Read the stored document. A store that has never been written is empty.
    async fn load_document(&self) -> Res<RecordDocument>;

    /// Replace the stored document.
    async fn persist_document(&self, document: &RecordDocument) -> Void;
}

// Structs.

/// Record client for review-bell.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct RecordClient {
    inner: Arc<dyn GenericRecordStore>,
    window: Duration,
    guard: Arc<Mutex<()>>,
}

impl RecordClient {
    pub fn new(inner: Arc<dyn GenericRecordStore>, window: Duration) -> Self {
        Self {
            inner,
            window,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Serialize a `load` -> `persist` cycle against every clone of this client.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().await
    }

    /// A client backed by the JSON file named in the configuration.
    pub fn file(config: &Config) -> Self {
        let window = Duration::seconds(config.record_window_secs as i64);

        Self::new(Arc::new(file::FileRecordStore::new(config.record_file.clone())), window)
    }

    /// A client backed by process memory.
    pub fn memory(window: Duration) -> Self {
        Self::new(Arc::new(memory::MemoryRecordStore::default()), window)
    }

    /// Load the current records.
    pub async fn load(&self) -> Res<NotifyRecords> {
        let document = self.inner.load_document().await?;

        Ok(NotifyRecords::new(document, self.window))
    }

    /// Write the records back, without the ones that went stale.
    pub async fn persist(&self, records: &mut NotifyRecords) -> Void {
        self.persist_at(records, Utc::now()).await
    }

    pub async fn persist_at(&self, records: &mut NotifyRecords, now: DateTime<Utc>) -> Void {
        records.retain_fresh(now);

        self.inner.persist_document(&records.to_document()).await
    }
}

/// Timestamps are written as RFC 3339.
///
/// Naive ISO-8601 timestamps (no offset) are read as local time.
mod datetime_format {
    use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }

        let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f").map_err(|e| D::Error::custom(format!("invalid record datetime `{raw}`: {e}")))?;

        naive
            .and_local_timezone(Local)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| D::Error::custom(format!("record datetime `{raw}` does not exist in the local timezone")))
    }
}

// Tests.
