use std::collections::VecDeque;

use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use tokio::sync::Mutex;

use crate::error::Error;
use crate::record::{ResponseRecord, ResponseStatus};

#[async_trait]
pub trait ResponseRepository: Send + Sync {
    async fn insert(&self, record: ResponseRecord) -> Result<ResponseRecord, Error>;
    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<ResponseRecord>, Error>;
    async fn update(&self, record: ResponseRecord) -> Result<ResponseRecord, Error>;

    /// Claims the next queued job, transitioning it to `in_progress`
    /// before returning it, so two workers never observe the same id as
    /// still queued — the in-memory stand-in for a `FOR UPDATE SKIP
    /// LOCKED` claim.
    async fn claim_next_queued(&self, now: Timestamp) -> Result<Option<ResponseRecord>, Error>;
}

#[derive(Default)]
pub struct InMemoryResponseRepository {
    records: DashMap<String, ResponseRecord>,
    queued_ids: Mutex<VecDeque<String>>,
}

impl InMemoryResponseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseRepository for InMemoryResponseRepository {
    async fn insert(&self, record: ResponseRecord) -> Result<ResponseRecord, Error> {
        if record.status == ResponseStatus::Queued {
            self.queued_ids.lock().await.push_back(record.public_id.clone());
        }

        self.records.insert(record.public_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<ResponseRecord>, Error> {
        Ok(self.records.get(public_id).map(|entry| entry.clone()))
    }

    async fn update(&self, record: ResponseRecord) -> Result<ResponseRecord, Error> {
        let mut entry = self.records.get_mut(&record.public_id).ok_or_else(|| Error::NotFound(record.public_id.clone()))?;
        *entry = record.clone();
        Ok(record)
    }

    async fn claim_next_queued(&self, now: Timestamp) -> Result<Option<ResponseRecord>, Error> {
        let mut queue = self.queued_ids.lock().await;

        while let Some(public_id) = queue.pop_front() {
            let Some(mut entry) = self.records.get_mut(&public_id) else { continue };

            if entry.status != ResponseStatus::Queued {
                continue;
            }

            entry.status = ResponseStatus::InProgress;
            entry.updated_at = now;
            return Ok(Some(entry.clone()));
        }

        Ok(None)
    }
}
