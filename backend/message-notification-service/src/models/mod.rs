use serde::{Deserialize, Serialize};

pub const NEW_MESSAGE_TITLE: &str = "You have new message(s).";
pub const NEW_MESSAGE_BODY: &str = "Tap to view the message(s).";
pub const NEW_MESSAGE_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Location of a message record: `messages/{chat_id}/{thread_id}/{message_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePath {
    pub chat_id: String,
    pub thread_id: String,
    /// Timestamp-like message identifier
    pub message_id: String,
}

impl std::fmt::Display for MessagePath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "messages/{}/{}/{}",
            self.chat_id, self.thread_id, self.message_id
        )
    }
}

/// A created chat message. Only `to` is read by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub to: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Creation event for a message record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreatedEvent {
    pub path: MessagePath,
    pub message: Message,
}

/// Recipient user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub notification_tokens: Option<Vec<String>>,
}

impl UserRecord {
    /// Registered device tokens; an absent column reads as no tokens
    pub fn tokens(&self) -> &[String] {
        self.notification_tokens.as_deref().unwrap_or(&[])
    }
}

/// Push payload: `{ notification: { title, body, click_action } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub notification: NotificationContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub click_action: String,
}

impl NotificationPayload {
    /// The generic new-message notification. Never carries sender or content.
    pub fn new_message() -> Self {
        Self {
            notification: NotificationContent {
                title: NEW_MESSAGE_TITLE.to_string(),
                body: NEW_MESSAGE_BODY.to_string(),
                click_action: NEW_MESSAGE_CLICK_ACTION.to_string(),
            },
        }
    }
}

impl From<&NotificationPayload> for fcm_shared::Notification {
    fn from(payload: &NotificationPayload) -> Self {
        fcm_shared::Notification {
            title: payload.notification.title.clone(),
            body: payload.notification.body.clone(),
            click_action: Some(payload.notification.click_action.clone()),
        }
    }
}

/// Per-token delivery error reported by the push provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryError {
    /// `messaging/...` error code
    pub code: String,
    pub message: String,
}

impl DeliveryError {
    /// True for errors confirming the token can never be delivered to again
    pub fn is_permanent(&self) -> bool {
        fcm_shared::FcmErrorCode::parse(&self.code).is_permanent_token_error()
    }
}

/// Outcome of a single-token delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub token: String,
    pub error: Option<DeliveryError>,
}

impl DeliveryResult {
    pub fn success(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            error: None,
        }
    }

    pub fn failure(
        token: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            error: Some(DeliveryError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// Result of handling one message-created event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Recipient has no registered tokens; nothing was sent or written
    NoTokens,
    Delivered {
        sent: usize,
        succeeded: usize,
        failed: usize,
        removed_tokens: Vec<String>,
        remaining_tokens: Vec<String>,
    },
}
