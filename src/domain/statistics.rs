use crate::domain::report::MulticastReport;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Identity of one logical push, used for find-or-create reconciliation.
///
/// Two sends with the same key accumulate into the same statistics record.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsKey {
    pub audience: String,
    pub title: String,
    pub text: String,
    pub auto: bool,
}

/// Additive update applied to a statistics record after a batch completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatisticsDelta {
    pub sending: u64,
    pub success: u64,
    pub failed: u64,
}

impl StatisticsDelta {
    /// Delta for one multicast batch: every token not reported unknown
    /// counts as a success.
    #[must_use]
    pub fn from_report(report: &MulticastReport) -> Self {
        Self {
            sending: report.attempted as u64,
            success: report.successes() as u64,
            failed: report.unknown_tokens.len() as u64,
        }
    }
}

/// Aggregate delivery counters for one logical push.
///
/// Owned by the statistics store; the channel only reads and writes through
/// [`crate::services::statistics::StatisticsStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushStatistics {
    pub id: Uuid,
    #[serde(rename = "for")]
    pub audience: String,
    pub title: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub auto: bool,
    pub status: bool,
    pub sending: u64,
    pub success: u64,
    pub failed: u64,
}

impl PushStatistics {
    /// Fresh zeroed record for the push identified by `key`.
    #[must_use]
    pub fn new(key: &StatisticsKey, date: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            audience: key.audience.clone(),
            title: key.title.clone(),
            text: key.text.clone(),
            date,
            auto: key.auto,
            status: false,
            sending: 0,
            success: 0,
            failed: 0,
        }
    }

    /// Applies `delta` to the counters and recomputes `status`.
    ///
    /// Maintains `sending = success + failed` as long as every delta does;
    /// the push counts as delivered once at least one send landed.
    pub fn apply_delta(&mut self, delta: &StatisticsDelta) {
        self.sending += delta.sending;
        self.success += delta.success;
        self.failed += delta.failed;
        self.status = self.success >= 1;
    }

    #[must_use]
    pub fn key(&self) -> StatisticsKey {
        StatisticsKey {
            audience: self.audience.clone(),
            title: self.title.clone(),
            text: self.text.clone(),
            auto: self.auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> StatisticsKey {
        StatisticsKey {
            audience: "everyone".into(),
            title: "Update".into(),
            text: "A new build is out".into(),
            auto: false,
        }
    }

    #[test]
    fn apply_delta_accumulates_and_keeps_counters_consistent() {
        let mut record = PushStatistics::new(&key(), OffsetDateTime::now_utc());

        record.apply_delta(&StatisticsDelta { sending: 500, success: 499, failed: 1 });
        record.apply_delta(&StatisticsDelta { sending: 500, success: 499, failed: 1 });

        assert_eq!(record.sending, 1000);
        assert_eq!(record.success, 998);
        assert_eq!(record.failed, 2);
        assert_eq!(record.sending, record.success + record.failed);
        assert!(record.status);
    }

    #[test]
    fn status_requires_at_least_one_success() {
        let mut record = PushStatistics::new(&key(), OffsetDateTime::now_utc());
        assert!(!record.status);

        record.apply_delta(&StatisticsDelta { sending: 3, success: 0, failed: 3 });
        assert!(!record.status, "all-failed push is not delivered");

        record.apply_delta(&StatisticsDelta { sending: 1, success: 1, failed: 0 });
        assert!(record.status);
    }

    #[test]
    fn delta_from_report_splits_attempted_into_success_and_failed() {
        let report = MulticastReport::new(500, vec!["t3".into(), "t7".into()]);
        let delta = StatisticsDelta::from_report(&report);

        assert_eq!(delta, StatisticsDelta { sending: 500, success: 498, failed: 2 });
    }
}
