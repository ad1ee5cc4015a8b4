use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::future::join_all;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::{FCMError, FcmErrorCode};
use crate::models::*;

const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com";
const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Firebase Cloud Messaging Client
///
/// Manages OAuth2 token generation, caching, and message delivery over the
/// FCM HTTP v1 API. Construct once per process and share behind an `Arc`.
pub struct FCMClient {
    pub project_id: String,
    pub credentials: Arc<ServiceAccountKey>,
    endpoint: String,
    token_cache: Arc<Mutex<Option<TokenCache>>>,
    http_client: reqwest::Client,
}

impl FCMClient {
    /// Create new FCM client
    ///
    /// # Arguments
    /// * `project_id` - Firebase project ID
    /// * `credentials` - Service account key with OAuth2 credentials
    pub fn new(project_id: String, credentials: ServiceAccountKey) -> Self {
        Self {
            project_id,
            credentials: Arc::new(credentials),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token_cache: Arc::new(Mutex::new(None)),
            http_client: reqwest::Client::new(),
        }
    }

    /// Load the service account key from a JSON file and build a client for its project.
    pub fn from_service_account_file(
        project_id: Option<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, FCMError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FCMError::CredentialsError(format!("{}: {}", path.display(), e)))?;
        let credentials: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| FCMError::CredentialsError(format!("{}: {}", path.display(), e)))?;

        let project_id = project_id.unwrap_or_else(|| credentials.project_id.clone());
        Ok(Self::new(project_id, credentials))
    }

    /// Override the FCM base URL (emulators, test servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        )
    }

    /// Send notification via FCM to a single device
    ///
    /// Returns the FCM message name on success.
    pub async fn send(
        &self,
        device_token: &str,
        notification: &Notification,
    ) -> Result<String, FCMError> {
        let access_token = self.get_access_token().await?;
        self.send_with_token(&access_token, device_token, notification)
            .await
    }

    async fn send_with_token(
        &self,
        access_token: &str,
        device_token: &str,
        notification: &Notification,
    ) -> Result<String, FCMError> {
        let message = FcmMessage {
            message: FcmMessageContent::for_device(device_token, notification),
        };

        let response = self
            .http_client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&message)
            .send()
            .await
            .map_err(|e| FCMError::SendRequestError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let fcm_response: FcmApiResponse = response
                .json()
                .await
                .map_err(|e| FCMError::ResponseParseError(e.to_string()))?;

            return Ok(fcm_response.name.unwrap_or_default());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let code = FcmErrorCode::from_response(status.as_u16(), &error_text);

        Err(FCMError::ApiError {
            status: status.as_u16(),
            code,
            message: error_text,
        })
    }

    /// Send the same notification to multiple devices
    ///
    /// The access token is obtained once for the whole batch; failing to get
    /// it fails the call. Individual deliveries run concurrently and their
    /// outcomes are returned in the order of `device_tokens`.
    pub async fn send_to_devices(
        &self,
        device_tokens: &[String],
        notification: &Notification,
    ) -> Result<MulticastSendResult, FCMError> {
        let access_token = self.get_access_token().await?;

        let sends = device_tokens.iter().map(|device_token| {
            let access_token = access_token.as_str();
            async move {
                match self
                    .send_with_token(access_token, device_token, notification)
                    .await
                {
                    Ok(message_id) => FCMSendResult {
                        token: device_token.clone(),
                        message_id: Some(message_id),
                        error: None,
                    },
                    Err(e) => {
                        warn!(error = %e, "FCM delivery failed");
                        FCMSendResult {
                            token: device_token.clone(),
                            message_id: None,
                            error: Some(FcmSendError {
                                code: e.code(),
                                message: e.to_string(),
                            }),
                        }
                    }
                }
            }
        });

        let results = join_all(sends).await;
        let success_count = results.iter().filter(|r| r.is_success()).count();
        let failure_count = results.len() - success_count;

        debug!(success_count, failure_count, "FCM multicast complete");

        Ok(MulticastSendResult {
            success_count,
            failure_count,
            results,
        })
    }

    /// Get access token from service account (with caching)
    pub async fn get_access_token(&self) -> Result<String, FCMError> {
        let mut cache = self.token_cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            // Still valid for at least 60 more seconds
            if cached.expires_at > Utc::now().timestamp() + 60 {
                return Ok(cached.access_token.clone());
            }
        }

        let now = Utc::now();
        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            sub: self.credentials.client_email.clone(),
            scope: MESSAGING_SCOPE.to_string(),
            aud: self.credentials.token_uri.clone(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| FCMError::KeyParseError(e.to_string()))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.credentials.private_key_id.clone());
        let assertion = encode(&header, &claims, &encoding_key)
            .map_err(|e| FCMError::JwtEncodeError(e.to_string()))?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FCMError::TokenError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FCMError::TokenRequestFailed(response.status().to_string()));
        }

        let token_response: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| FCMError::TokenParseError(e.to_string()))?;

        *cache = Some(TokenCache {
            access_token: token_response.access_token.clone(),
            expires_at: Utc::now().timestamp() + token_response.expires_in,
        });

        Ok(token_response.access_token)
    }
}
