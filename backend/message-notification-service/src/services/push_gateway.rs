/// Push delivery seam
///
/// The dispatcher talks to the push provider through `PushGateway` so the
/// provider client is built once at startup and shared by reference.
use async_trait::async_trait;
use fcm_shared::{FCMClient, Notification};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::models::{DeliveryResult, NotificationPayload};

#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Send `payload` to every token in one batched call.
    ///
    /// On success the returned vector has exactly one entry per input token,
    /// in input order. An `Err` means the batch as a whole failed.
    async fn send_to_devices(
        &self,
        tokens: &[String],
        payload: &NotificationPayload,
    ) -> Result<Vec<DeliveryResult>>;
}

/// `PushGateway` backed by Firebase Cloud Messaging
pub struct FcmPushGateway {
    client: Arc<FCMClient>,
}

impl FcmPushGateway {
    pub fn new(client: Arc<FCMClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PushGateway for FcmPushGateway {
    async fn send_to_devices(
        &self,
        tokens: &[String],
        payload: &NotificationPayload,
    ) -> Result<Vec<DeliveryResult>> {
        let notification = Notification::from(payload);
        let response = self.client.send_to_devices(tokens, &notification).await?;

        debug!(
            success_count = response.success_count,
            failure_count = response.failure_count,
            "FCM batch delivered"
        );

        Ok(response
            .results
            .into_iter()
            .map(|result| match result.error {
                None => DeliveryResult::success(result.token),
                Some(error) => {
                    DeliveryResult::failure(result.token, error.code.as_str(), error.message)
                }
            })
            .collect())
    }
}
