use crate::domain::statistics::StatisticsKey;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message value handed to the provider. Immutable once dispatched, aside
/// from the token assigned on the single-device path.
///
/// `audience` is serialized as `for` to match the provider payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcmMessage {
    #[serde(rename = "for")]
    pub audience: String,
    pub title: String,
    pub body: String,
    pub auto: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Back-reference to the statistics record of the parent push, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_id: Option<Uuid>,
}

impl FcmMessage {
    #[must_use]
    pub fn new(audience: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            title: title.into(),
            body: body.into(),
            auto: false,
            token: None,
            push_id: None,
        }
    }

    /// Marks the message as generated by an automated push.
    #[must_use]
    pub const fn auto(mut self, auto: bool) -> Self {
        self.auto = auto;
        self
    }

    /// Links the message to the statistics record of its parent push.
    #[must_use]
    pub const fn push_id(mut self, id: Uuid) -> Self {
        self.push_id = Some(id);
        self
    }

    /// Assigns the destination token for a single-device send.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Identity key of the statistics record this message reconciles into.
    #[must_use]
    pub fn statistics_key(&self) -> StatisticsKey {
        StatisticsKey {
            audience: self.audience.clone(),
            title: self.title.clone(),
            text: self.body.clone(),
            auto: self.auto,
        }
    }
}
