use serde::{Deserialize, Serialize};

use crate::errors::FcmErrorCode;

/// Notification content delivered to a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Client-side action the app runs when the notification is tapped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_action: Option<String>,
}

/// Per-device delivery error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcmSendError {
    pub code: FcmErrorCode,
    pub message: String,
}

/// FCM Send Result for a single device
#[derive(Debug, Clone)]
pub struct FCMSendResult {
    pub token: String,
    pub message_id: Option<String>,
    pub error: Option<FcmSendError>,
}

impl FCMSendResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Multicast send result
///
/// `results[i]` is the outcome for the i-th token passed to the send call.
#[derive(Debug, Clone)]
pub struct MulticastSendResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<FCMSendResult>,
}

/// Firebase Service Account Key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// OAuth2 Token Cache
#[derive(Debug, Clone)]
pub struct TokenCache {
    pub access_token: String,
    pub expires_at: i64,
}

/// JWT Claims for Google OAuth2
#[derive(Debug, Serialize)]
pub struct JwtClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// Google OAuth2 Token Response
#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// FCM Message Request
#[derive(Debug, Serialize)]
pub struct FcmMessage {
    pub message: FcmMessageContent,
}

/// FCM Message Content
#[derive(Debug, Serialize)]
pub struct FcmMessageContent {
    pub token: String,
    pub notification: FcmNotification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<serde_json::Value>,
}

impl FcmMessageContent {
    pub fn for_device(token: &str, notification: &Notification) -> Self {
        // v1 has no top-level click_action; Android carries it natively, and
        // the data copy lets other platforms route the tap the same way.
        let (data, android) = match &notification.click_action {
            Some(action) => (
                Some(serde_json::json!({ "click_action": action })),
                Some(serde_json::json!({ "notification": { "click_action": action } })),
            ),
            None => (None, None),
        };

        Self {
            token: token.to_string(),
            notification: FcmNotification {
                title: notification.title.clone(),
                body: notification.body.clone(),
            },
            data,
            android,
        }
    }
}

/// FCM Notification Payload
#[derive(Debug, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

/// FCM API Response
#[derive(Debug, Deserialize)]
pub struct FcmApiResponse {
    pub name: Option<String>,
}

/// FCM API error body (`google.rpc.Status` wrapped in `error`)
#[derive(Debug, Deserialize)]
pub struct FcmApiErrorEnvelope {
    pub error: FcmApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct FcmApiErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct FcmErrorDetail {
    #[serde(rename = "@type")]
    pub type_url: Option<String>,
    #[serde(rename = "errorCode")]
    pub error_code: Option<String>,
}
