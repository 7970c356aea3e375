use crate::domain::statistics::{PushStatistics, StatisticsDelta, StatisticsKey};
use crate::services::statistics::StatisticsStore;
use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use uuid::Uuid;

/// `DashMap`-backed statistics store for in-process use and tests.
///
/// Entry-level locking serializes `apply` per record, so concurrent sends
/// reconciling into the same push do not lose updates.
#[derive(Debug, Default)]
pub struct InMemoryStatisticsStore {
    by_key: DashMap<StatisticsKey, Uuid>,
    records: DashMap<Uuid, PushStatistics>,
}

impl InMemoryStatisticsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the record `id`, if present.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<PushStatistics> {
        self.records.get(&id).map(|record| record.value().clone())
    }

    /// Snapshot of the record matching `key`, if present.
    #[must_use]
    pub fn find(&self, key: &StatisticsKey) -> Option<PushStatistics> {
        let id = *self.by_key.get(key)?;
        self.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl StatisticsStore for InMemoryStatisticsStore {
    async fn create(&self, record: PushStatistics) -> anyhow::Result<PushStatistics> {
        // A record created over an existing key supersedes the old one.
        if let Some(previous) = self.by_key.insert(record.key(), record.id)
            && previous != record.id
        {
            self.records.remove(&previous);
        }
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn first_or_create(&self, key: &StatisticsKey, date: OffsetDateTime) -> anyhow::Result<PushStatistics> {
        let id = *self.by_key.entry(key.clone()).or_insert_with(Uuid::new_v4);
        let record = self
            .records
            .entry(id)
            .or_insert_with(|| {
                let mut record = PushStatistics::new(key, date);
                record.id = id;
                record
            })
            .value()
            .clone();
        Ok(record)
    }

    async fn apply(&self, id: Uuid, delta: &StatisticsDelta) -> anyhow::Result<PushStatistics> {
        let mut record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("unknown statistics record: {id}"))?;
        record.apply_delta(delta);
        Ok(record.value().clone())
    }
}
