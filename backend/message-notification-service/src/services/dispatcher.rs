/// New-message notification dispatcher
///
/// Handles one message-created event end to end:
/// 1. Resolve the recipient named by the message's `to` field
/// 2. Read the recipient's device tokens (none means nothing to do)
/// 3. Send the generic new-message payload to every token in one batch
/// 4. Drop tokens the provider reports as permanently undeliverable
///
/// Nothing is retried here; any failure fails the invocation and the
/// trigger source decides whether to re-deliver the event.
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{DeliveryResult, DispatchOutcome, MessageCreatedEvent, NotificationPayload};
use crate::repository::UserRepository;
use crate::services::PushGateway;

pub struct NotificationDispatcher {
    users: Arc<dyn UserRepository>,
    push: Arc<dyn PushGateway>,
}

impl NotificationDispatcher {
    pub fn new(users: Arc<dyn UserRepository>, push: Arc<dyn PushGateway>) -> Self {
        Self { users, push }
    }

    /// Notify the recipient of a newly created message
    #[instrument(skip(self, event), fields(path = %event.path, recipient = %event.message.to))]
    pub async fn handle_message_created(
        &self,
        event: &MessageCreatedEvent,
    ) -> Result<DispatchOutcome> {
        let result = self.dispatch(event).await;

        let outcome = match &result {
            Ok(DispatchOutcome::NoTokens) => "no_tokens",
            Ok(DispatchOutcome::Delivered { .. }) => "delivered",
            Err(e) => {
                warn!(error = %e, "Message notification failed");
                e.kind()
            }
        };
        metrics::record_invocation(outcome);

        result
    }

    async fn dispatch(&self, event: &MessageCreatedEvent) -> Result<DispatchOutcome> {
        let recipient_id = event.message.to.as_str();

        let recipient = self
            .users
            .find_user(recipient_id)
            .await?
            .ok_or_else(|| AppError::RecipientNotFound(recipient_id.to_string()))?;

        let tokens = recipient.tokens();
        if tokens.is_empty() {
            info!("There are no notification tokens to send to");
            return Ok(DispatchOutcome::NoTokens);
        }

        let payload = NotificationPayload::new_message();
        let results = self.push.send_to_devices(tokens, &payload).await?;

        if results.len() != tokens.len() {
            return Err(AppError::Provider(format!(
                "expected {} delivery results, got {}",
                tokens.len(),
                results.len()
            )));
        }

        let succeeded = results.iter().filter(|r| r.error.is_none()).count();
        let failed = results.len() - succeeded;
        metrics::record_push_results(succeeded, failed);

        let removed_tokens = tokens_to_remove(tokens, &results);
        let remaining_tokens = retain_tokens(tokens, &removed_tokens);

        self.users
            .remove_notification_tokens(recipient_id, &removed_tokens)
            .await?;
        metrics::record_tokens_pruned(removed_tokens.len());

        info!(
            sent = tokens.len(),
            succeeded,
            failed,
            removed = removed_tokens.len(),
            "Message notification delivered"
        );

        Ok(DispatchOutcome::Delivered {
            sent: tokens.len(),
            succeeded,
            failed,
            removed_tokens,
            remaining_tokens,
        })
    }
}

/// Tokens whose delivery failed with a permanent token error.
///
/// `results[i]` must be the outcome for `tokens[i]`. Other failures are
/// logged and the token is kept.
pub fn tokens_to_remove(tokens: &[String], results: &[DeliveryResult]) -> Vec<String> {
    let mut removed = Vec::new();

    for (token, result) in tokens.iter().zip(results) {
        let Some(error) = &result.error else {
            continue;
        };

        warn!(
            token = %token,
            code = %error.code,
            error = %error.message,
            "Failure sending notification"
        );

        if error.is_permanent() {
            removed.push(token.clone());
        }
    }

    removed
}

/// `tokens` without any token in `removed`, order preserved
pub fn retain_tokens(tokens: &[String], removed: &[String]) -> Vec<String> {
    let removed: HashSet<&str> = removed.iter().map(String::as_str).collect();
    tokens
        .iter()
        .filter(|token| !removed.contains(token.as_str()))
        .cloned()
        .collect()
}
