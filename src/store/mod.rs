pub mod record;
pub mod snapshot;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, CoreConfig};
use crate::document::chunk::build_chunks;
use crate::document::chunker::Chunker;
use crate::embedding::{self, Encoder};
use crate::error::CoreError;
use crate::types::deadline::Deadline;
use crate::types::identifiers::Handle;
use crate::types::retrieval::StoreStatus;

pub use record::Record;
pub use snapshot::{SnapshotError, SnapshotTier};

/// Handle-addressed collection of records.
///
/// Memory is authoritative. The snapshot tier, when configured, is written
/// after each create and read only on a memory miss; its failures are
/// logged and never change the outcome of a call.
///
/// The map is sharded, so lookups of different handles do not contend and
/// creates never take a lock over the whole map.
pub struct Store {
    records: DashMap<Handle, Arc<Record>>,
    chunker: Chunker,
    encoder: Arc<dyn Encoder>,
    snapshots: SnapshotTier,
    credential_env: Option<String>,
    max_age: Option<Duration>,
}

impl Store {
    /// Memory-only store with no credential gate and no expiry.
    pub fn new(chunker: Chunker, encoder: Arc<dyn Encoder>) -> Self {
        Self {
            records: DashMap::new(),
            chunker,
            encoder,
            snapshots: SnapshotTier::disabled(),
            credential_env: None,
            max_age: None,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut store = Store::new(config.chunking.chunker()?, embedding::encoder_for(&config.encoder))
            .with_snapshots(SnapshotTier::new(config.store.snapshot_dirs.clone()));
        if let Some(var) = &config.store.credential_env {
            store = store.with_credential_env(var.clone());
        }
        if let Some(secs) = config.store.max_age_secs {
            let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
            store = store.with_max_age(Duration::seconds(secs));
        }
        Ok(store)
    }

    pub fn with_snapshots(mut self, snapshots: SnapshotTier) -> Self {
        self.snapshots = snapshots;
        self
    }

    pub fn with_credential_env(mut self, var: impl Into<String>) -> Self {
        self.credential_env = Some(var.into());
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn encoder(&self) -> &dyn Encoder {
        self.encoder.as_ref()
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Chunk, encode and store `text`, returning the new handle.
    ///
    /// The credential gate is checked before any work is done. The handle is
    /// inserted only once the record is complete, so no caller can observe a
    /// partial record.
    pub fn create(&self, text: &str, source_label: &str) -> Result<Handle, CoreError> {
        self.create_within(text, source_label, Deadline::unbounded())
    }

    /// As [`Store::create`], giving up between stages once `deadline` passes.
    pub fn create_within(
        &self,
        text: &str,
        source_label: &str,
        deadline: Deadline,
    ) -> Result<Handle, CoreError> {
        self.check_backend()?;

        if text.trim().is_empty() {
            return Err(CoreError::Ingest(format!(
                "document {source_label:?} contains no text"
            )));
        }

        deadline.check("chunking")?;
        let spans = self.chunker.spans(text);
        let chunks = build_chunks(text, &spans, source_label);
        let chunk_count = chunks.len();

        deadline.check("encoding")?;

        let mut handle = Handle::generate();
        let record = Record::build(
            handle.clone(),
            text.to_string(),
            source_label.to_string(),
            chunks,
            self.encoder.as_ref(),
            Utc::now(),
        )
        .ok_or_else(|| CoreError::Ingest(format!("document {source_label:?} produced no chunks")))?;
        let mut record = Arc::new(record);

        deadline.check("insert")?;
        loop {
            match self.records.entry(handle.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(&record));
                    break;
                }
                Entry::Occupied(_) => {
                    // v4 collision; rebuild under a fresh handle
                    handle = Handle::generate();
                    record = Arc::new(record.as_ref().clone().with_handle(handle.clone()));
                }
            }
        }

        info!(
            handle = %handle,
            source = source_label,
            chars = text.chars().count(),
            chunks = chunk_count,
            encoder = self.encoder.id(),
            "Record created"
        );

        if let Err(e) = self.snapshots.write(&record) {
            warn!(handle = %handle, error = %e, "Snapshot write failed; record kept in memory only");
        }

        Ok(handle)
    }

    /// Find the record for `handle`: memory first, then the snapshot tier.
    ///
    /// A record found on disk is cached in memory before it is returned.
    pub fn lookup(&self, handle: &str) -> Result<Arc<Record>, CoreError> {
        self.lookup_within(handle, Deadline::unbounded())
    }

    /// As [`Store::lookup`]; the snapshot tier is skipped once `deadline`
    /// has passed.
    pub fn lookup_within(&self, handle: &str, deadline: Deadline) -> Result<Arc<Record>, CoreError> {
        let handle = Handle::from_raw(handle);
        let now = Utc::now();

        let cached = self.records.get(&handle).map(|r| Arc::clone(r.value()));
        if let Some(record) = cached {
            if self.is_expired(&record, now) {
                self.records.remove(&handle);
                debug!(handle = %handle, "Record expired");
                return Err(CoreError::NotFound(handle.as_str().to_string()));
            }
            debug!(handle = %handle, "Record found in memory");
            return Ok(record);
        }

        if self.snapshots.is_enabled() {
            deadline.check("snapshot lookup")?;
        }
        match self.warm_from_snapshot(&handle, now) {
            Some(record) => Ok(record),
            None => {
                debug!(handle = %handle, records = self.records.len(), "Record not found");
                Err(CoreError::NotFound(handle.as_str().to_string()))
            }
        }
    }

    fn warm_from_snapshot(&self, handle: &Handle, now: DateTime<Utc>) -> Option<Arc<Record>> {
        if !self.snapshots.is_enabled() || !handle.is_well_formed() {
            return None;
        }

        let record = match self.snapshots.read(handle, self.encoder.as_ref()) {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!(handle = %handle, error = %e, "Snapshot read failed");
                return None;
            }
        };

        if self.is_expired(&record, now) {
            debug!(handle = %handle, "Snapshot expired");
            return None;
        }

        // Another caller may have warmed the same handle meanwhile; keep
        // whichever landed first.
        let record = Arc::clone(
            self.records
                .entry(handle.clone())
                .or_insert_with(|| Arc::new(record))
                .value(),
        );
        info!(handle = %handle, chunks = record.len(), "Record restored from snapshot");
        Some(record)
    }

    pub fn status(&self) -> StoreStatus {
        let handles: BTreeSet<String> = self
            .records
            .iter()
            .map(|entry| entry.key().as_str().to_string())
            .collect();

        StoreStatus {
            record_count: handles.len(),
            handles,
            backend_ready: self.check_backend().is_ok(),
            encoder: self.encoder.id().to_string(),
            snapshot_dirs: self.snapshots.dirs().to_vec(),
        }
    }

    /// Drop a record from memory and from every snapshot directory.
    pub fn remove(&self, handle: &str) -> bool {
        let handle = Handle::from_raw(handle);
        let in_memory = self.records.remove(&handle).is_some();

        let on_disk = if self.snapshots.is_enabled() && handle.is_well_formed() {
            self.snapshots.remove(&handle).unwrap_or_else(|e| {
                warn!(handle = %handle, error = %e, "Snapshot removal failed");
                false
            })
        } else {
            false
        };

        in_memory || on_disk
    }

    /// Drop in-memory records older than the configured max age.
    /// Returns how many were dropped.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        if self.max_age.is_none() {
            return 0;
        }
        let mut purged = 0;
        self.records.retain(|_, record| {
            let keep = !self.is_expired(record, now);
            if !keep {
                purged += 1;
            }
            keep
        });
        if purged > 0 {
            info!(purged, "Expired records purged");
        }
        purged
    }

    fn is_expired(&self, record: &Record, now: DateTime<Utc>) -> bool {
        match self.max_age {
            Some(max_age) => now - record.created_at() > max_age,
            None => false,
        }
    }

    fn check_backend(&self) -> Result<(), ConfigError> {
        let Some(var) = &self.credential_env else {
            return Ok(());
        };
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingCredential { var: var.clone() }),
        }
    }
}
