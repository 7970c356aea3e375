use crate::config::{ChannelConfig, TransportErrorPolicy};
use crate::domain::message::FcmMessage;
use crate::domain::statistics::StatisticsDelta;
use crate::error::{ChannelError, Result};
use crate::services::notifiable::{Notifiable, Notification};
use crate::services::provider::{Messaging, PushError};
use crate::services::statistics::StatisticsStore;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// Message transformation applied to every send before dispatch.
///
/// Installed once at construction; destination tokens are resolved before
/// the hook runs and are unaffected by it.
pub type BeforeSendHook = Arc<dyn Fn(FcmMessage, &dyn Notification, &dyn Notifiable) -> FcmMessage + Send + Sync>;

#[derive(Clone, Debug)]
struct Metrics {
    sent: Counter<u64>,
    failed: Counter<u64>,
    errors: Counter<u64>,
    invalidated_tokens: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("fcm-channel");
        Self {
            sent: meter
                .u64_counter("push_sent_total")
                .with_description("Total number of push notifications successfully delivered")
                .build(),
            failed: meter
                .u64_counter("push_failed_total")
                .with_description("Total number of push notifications the provider rejected")
                .build(),
            errors: meter
                .u64_counter("push_errors_total")
                .with_description("Total number of provider transport errors")
                .build(),
            invalidated_tokens: meter
                .u64_counter("push_invalidated_tokens_total")
                .with_description("Total number of device tokens removed due to being unregistered")
                .build(),
        }
    }
}

/// Push dispatcher: partitions destination tokens into provider-sized
/// batches, sends each batch, reconciles delivery counts into a statistics
/// record, and prunes device registrations the provider rejects.
pub struct FcmChannel {
    messaging: Arc<dyn Messaging>,
    statistics: Arc<dyn StatisticsStore>,
    config: ChannelConfig,
    before_send: Option<BeforeSendHook>,
    metrics: Metrics,
}

impl std::fmt::Debug for FcmChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FcmChannel")
            .field("messaging", &self.messaging)
            .field("statistics", &self.statistics)
            .field("config", &self.config)
            .field("before_send", &self.before_send.as_ref().map(|_| "<hook>"))
            .finish_non_exhaustive()
    }
}

impl FcmChannel {
    #[must_use]
    pub fn new(messaging: Arc<dyn Messaging>, statistics: Arc<dyn StatisticsStore>, config: ChannelConfig) -> Self {
        // chunks() panics on a zero chunk size; the clap parser rejects 0 but
        // the config can also be built directly.
        let config = ChannelConfig { max_tokens_per_request: config.max_tokens_per_request.max(1), ..config };
        Self { messaging, statistics, config, before_send: None, metrics: Metrics::new() }
    }

    /// Installs the before-send transformation.
    #[must_use]
    pub fn with_before_send(mut self, hook: BeforeSendHook) -> Self {
        self.before_send = Some(hook);
        self
    }

    /// Sends `notification` to every destination token of `notifiable`.
    ///
    /// An empty token list is a silent no-op. A single resolved token takes
    /// the single-send path even when it came from a multi-token source.
    /// Provider transport failures are absorbed and handled per the
    /// configured [`TransportErrorPolicy`]; callers learn the delivery
    /// outcome from the statistics store.
    ///
    /// # Errors
    /// Returns [`ChannelError::InvalidMessage`] if the notification does not
    /// produce an FCM message. No side effect has occurred at that point.
    #[tracing::instrument(skip_all, name = "fcm_send")]
    pub async fn send(&self, notifiable: &dyn Notifiable, notification: &dyn Notification) -> Result<()> {
        let tokens = notifiable.route_tokens();
        if tokens.is_empty() {
            tracing::debug!("No destination tokens resolved, skipping send");
            return Ok(());
        }

        let mut message = notification.to_fcm(notifiable).ok_or(ChannelError::InvalidMessage)?;

        if let Some(hook) = &self.before_send {
            message = hook(message, notification, notifiable);
        }

        if let [token] = tokens.as_slice() {
            self.send_single(notifiable, message, token).await;
        } else {
            self.send_all(notifiable, &message, &tokens).await;
        }

        Ok(())
    }

    async fn send_single(&self, notifiable: &dyn Notifiable, mut message: FcmMessage, token: &str) {
        message.set_token(token);

        let delta = match self.messaging.send(&message).await {
            Ok(true) => {
                tracing::debug!(token = %token, "Push notification sent successfully");
                self.metrics.sent.add(1, &[]);
                StatisticsDelta { sending: 1, success: 1, failed: 0 }
            }
            Ok(false) => {
                tracing::debug!(token = %token, "Provider rejected push delivery");
                self.metrics.failed.add(1, &[]);
                StatisticsDelta { sending: 1, success: 0, failed: 1 }
            }
            Err(PushError::Unregistered) => {
                tracing::info!(token = %token, "Token unregistered, deleting device registration");
                self.metrics.failed.add(1, &[]);
                self.metrics.invalidated_tokens.add(1, &[]);
                self.delete_devices(notifiable, &[token.to_string()]).await;
                StatisticsDelta { sending: 1, success: 0, failed: 1 }
            }
            Err(e) => {
                tracing::error!(error = %e, token = %token, "Transport error during single push");
                self.metrics.errors.add(1, &[KeyValue::new("path", "single")]);
                match self.config.transport_error_policy {
                    TransportErrorPolicy::RecordFailure => StatisticsDelta { sending: 1, success: 0, failed: 1 },
                    // Leaves the statistics store untouched.
                    TransportErrorPolicy::LogOnly => return,
                }
            }
        };

        let push_id = self.load_statistics(&message).await;
        self.apply_delta(push_id, &delta).await;
    }

    async fn send_all(&self, notifiable: &dyn Notifiable, message: &FcmMessage, tokens: &[String]) {
        let push_id = self.load_statistics(message).await;

        let total_batches = tokens.len().div_ceil(self.config.max_tokens_per_request);
        for (index, batch) in tokens.chunks(self.config.max_tokens_per_request).enumerate() {
            let report = match self.messaging.send_multicast(message, batch).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        batch = index + 1,
                        total_batches,
                        "Transport error during multicast push, aborting dispatch"
                    );
                    self.metrics.errors.add(1, &[KeyValue::new("path", "multicast")]);
                    if self.config.transport_error_policy == TransportErrorPolicy::RecordFailure {
                        let failed = batch.len() as u64;
                        self.apply_delta(push_id, &StatisticsDelta { sending: failed, success: 0, failed }).await;
                    }
                    // Remaining batches are never attempted; side effects of
                    // earlier batches stand.
                    return;
                }
            };

            tracing::debug!(
                batch = index + 1,
                total_batches,
                attempted = report.attempted,
                failed = report.unknown_tokens.len(),
                "Multicast batch dispatched"
            );
            self.metrics.sent.add(report.successes() as u64, &[]);

            if !report.unknown_tokens.is_empty() {
                self.metrics.failed.add(report.unknown_tokens.len() as u64, &[]);
                self.metrics.invalidated_tokens.add(report.unknown_tokens.len() as u64, &[]);
                self.delete_devices(notifiable, &report.unknown_tokens).await;
            }

            self.apply_delta(push_id, &StatisticsDelta::from_report(&report)).await;
        }
    }

    async fn load_statistics(&self, message: &FcmMessage) -> Option<Uuid> {
        match self.statistics.first_or_create(&message.statistics_key(), OffsetDateTime::now_utc()).await {
            Ok(record) => Some(record.id),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load statistics record, delivery counts will be dropped");
                None
            }
        }
    }

    async fn apply_delta(&self, push_id: Option<Uuid>, delta: &StatisticsDelta) {
        let Some(id) = push_id else { return };
        if let Err(e) = self.statistics.apply(id, delta).await {
            tracing::warn!(error = %e, push_id = %id, "Failed to update statistics record");
        }
    }

    async fn delete_devices(&self, notifiable: &dyn Notifiable, tokens: &[String]) {
        match notifiable.devices().delete_by_tokens(tokens).await {
            Ok(count) => tracing::info!(count, "Deleted unregistered device tokens"),
            Err(e) => tracing::error!(error = %e, "Failed to delete unregistered device tokens"),
        }
    }
}
