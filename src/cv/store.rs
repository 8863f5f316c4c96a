//! In-memory holder for the latest CV record.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cv::model::{CvData, SectionData};
use crate::time::Clock;

#[derive(Debug, Error)]
pub enum CvStoreError {
    #[error("CV not found")]
    NotFound,

    #[error("failed to read CV seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CV seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A stored CV with bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    pub id: Uuid,
    pub data: CvData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Holds at most one record: the latest CV.
#[derive(Debug)]
pub struct CvStore {
    record: RwLock<Option<CvRecord>>,
    clock: Arc<dyn Clock>,
}

impl CvStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            record: RwLock::new(None),
            clock,
        }
    }

    /// Start with the CV stored as JSON at `path`.
    pub fn from_seed_file(path: &Path, clock: Arc<dyn Clock>) -> Result<Self, CvStoreError> {
        let content = std::fs::read_to_string(path)?;
        let data: CvData = serde_json::from_str(&content)?;
        let now = now_utc(clock.as_ref());

        tracing::info!(path = %path.display(), "CV seeded from file");
        Ok(Self {
            record: RwLock::new(Some(CvRecord {
                id: Uuid::new_v4(),
                data,
                created_at: now,
                updated_at: now,
            })),
            clock,
        })
    }

    pub async fn latest(&self) -> Option<CvRecord> {
        self.record.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        usize::from(self.record.read().await.is_some())
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Replace the whole CV, keeping the record id when one exists.
    pub async fn replace(&self, data: CvData) -> CvRecord {
        let now = now_utc(self.clock.as_ref());
        let mut slot = self.record.write().await;
        let record = match slot.take() {
            Some(existing) => CvRecord {
                data,
                updated_at: now,
                ..existing
            },
            None => CvRecord {
                id: Uuid::new_v4(),
                data,
                created_at: now,
                updated_at: now,
            },
        };
        *slot = Some(record.clone());
        record
    }

    /// Overwrite one section of the existing CV.
    pub async fn replace_section(&self, section: SectionData) -> Result<CvRecord, CvStoreError> {
        let now = now_utc(self.clock.as_ref());
        let mut slot = self.record.write().await;
        let record = slot.as_mut().ok_or(CvStoreError::NotFound)?;

        let name = section.section();
        section.apply_to(&mut record.data);
        record.updated_at = now;

        tracing::info!(section = %name, id = %record.id, "CV section updated");
        Ok(record.clone())
    }
}

fn now_utc(clock: &dyn Clock) -> DateTime<Utc> {
    let millis = i64::try_from(clock.now_millis()).unwrap_or(i64::MAX);
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
