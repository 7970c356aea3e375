use crate::domain::statistics::{PushStatistics, StatisticsDelta, StatisticsKey};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Store of per-push delivery statistics.
///
/// The record lives behind this trait so the embedder chooses its own
/// persistence; the channel only reads and writes through this interface and
/// never owns the record lifecycle beyond the current send.
#[async_trait]
pub trait StatisticsStore: Send + Sync + std::fmt::Debug {
    /// Persists a fully formed record.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails.
    async fn create(&self, record: PushStatistics) -> anyhow::Result<PushStatistics>;

    /// Returns the record matching `key`, creating a zeroed one dated `date`
    /// if none exists.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails.
    async fn first_or_create(&self, key: &StatisticsKey, date: OffsetDateTime) -> anyhow::Result<PushStatistics>;

    /// Additively applies `delta` to the record `id` and returns the updated
    /// record. Must be atomic with respect to concurrent appliers.
    ///
    /// # Errors
    /// Returns an error if no record with `id` exists or the store fails.
    async fn apply(&self, id: Uuid, delta: &StatisticsDelta) -> anyhow::Result<PushStatistics>;
}
