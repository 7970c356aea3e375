use crate::domain::message::FcmMessage;
use async_trait::async_trait;

/// Store of device registrations owned by a notifiable entity.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Deletes every registration whose token appears in `tokens`.
    ///
    /// Returns the number of registrations removed.
    ///
    /// # Errors
    /// Returns an error if the underlying store fails; the channel logs and
    /// moves on, this is a corrective side effect with no rollback.
    async fn delete_by_tokens(&self, tokens: &[String]) -> anyhow::Result<u64>;
}

/// An entity that can receive pushes on this channel.
pub trait Notifiable: Send + Sync {
    /// Destination token(s) for this entity. An empty list makes the send a
    /// silent no-op.
    fn route_tokens(&self) -> Vec<String>;

    /// The entity's device registrations, for pruning unknown tokens.
    fn devices(&self) -> &dyn DeviceStore;
}

/// Produces the channel message for a notifiable entity.
pub trait Notification: Send + Sync {
    /// Returns `None` when the notification cannot produce a message of the
    /// expected shape; the channel then rejects the send before any network
    /// call.
    fn to_fcm(&self, notifiable: &dyn Notifiable) -> Option<FcmMessage>;
}
