//! # Delivery Store
//!
//! Where flight progress is persisted between ticks. [`JsonFileStore`] keeps one
//! `<order>.json` per delivery and replaces it atomically (write a temp file, then
//! rename), so a crash mid-write leaves the previous tick intact.

use crate::delivery::{DeliveryError, DeliveryRecord, FlightPhase};
use crate::model::OrderId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[async_trait]
pub trait DeliveryStore: Send + Sync {
    async fn save(&self, record: &DeliveryRecord) -> Result<(), DeliveryError>;

    async fn load(&self, order_id: OrderId) -> Result<Option<DeliveryRecord>, DeliveryError>;

    /// Every readable record, ordered by order id.
    async fn all(&self) -> Result<Vec<DeliveryRecord>, DeliveryError>;

    /// Records still marked `IN_FLIGHT`, ordered by order id.
    async fn in_flight(&self) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let mut records = self.all().await?;
        records.retain(|record| record.phase == FlightPhase::InFlight);
        Ok(records)
    }

    /// Highest order id any record names, finished or not. Order numbering resumes
    /// above it so a new order never inherits an old flight.
    async fn last_order_id(&self) -> Result<Option<OrderId>, DeliveryError> {
        Ok(self.all().await?.last().map(|record| record.order_id))
    }
}

pub struct JsonFileStore {
    dir: PathBuf,
    // distinct temp names for overlapping writes to one record
    write_seq: AtomicU64,
}

impl JsonFileStore {
    /// Opens the store, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, DeliveryError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            write_seq: AtomicU64::new(0),
        })
    }

    fn path_for(&self, order_id: OrderId) -> PathBuf {
        self.dir.join(format!("{order_id}.json"))
    }
}

#[async_trait]
impl DeliveryStore for JsonFileStore {
    async fn save(&self, record: &DeliveryRecord) -> Result<(), DeliveryError> {
        let path = self.path_for(record.order_id);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!("{}.{seq}.tmp", record.order_id));

        let bytes = serde_json::to_vec_pretty(record)?;
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;
        debug!(order_id = %record.order_id, progress = record.progress, "Delivery record saved");
        Ok(())
    }

    async fn load(&self, order_id: OrderId) -> Result<Option<DeliveryRecord>, DeliveryError> {
        match fs::read(self.path_for(order_id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn all(&self) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<DeliveryRecord>(&bytes) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable delivery record"),
            }
        }
        records.sort_by_key(|record| record.order_id);
        Ok(records)
    }
}

/// Keeps records in memory only. For tests and for running without a data directory.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<OrderId, DeliveryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn save(&self, record: &DeliveryRecord) -> Result<(), DeliveryError> {
        self.records
            .lock()
            .await
            .insert(record.order_id, record.clone());
        Ok(())
    }

    async fn load(&self, order_id: OrderId) -> Result<Option<DeliveryRecord>, DeliveryError> {
        Ok(self.records.lock().await.get(&order_id).cloned())
    }

    async fn all(&self) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let mut records: Vec<DeliveryRecord> = self.records.lock().await.values().cloned().collect();
        records.sort_by_key(|record| record.order_id);
        Ok(records)
    }
}
