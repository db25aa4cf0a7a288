pub mod telegram;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::format::NotificationPayload;

pub type RecipientId = String;

/// Per-recipient result of sending one payload.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub recipient: RecipientId,
    pub result: Result<(), DeliveryError>,
}

/// Delivers one rendered payload to each recipient independently: one
/// recipient's failure never prevents attempting the others.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(
        &self,
        payload: &NotificationPayload,
        recipients: &[RecipientId],
    ) -> Vec<DeliveryOutcome>;
}
