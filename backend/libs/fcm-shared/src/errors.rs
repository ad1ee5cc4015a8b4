use std::fmt;

use thiserror::Error;

use crate::models::FcmApiErrorEnvelope;

/// FCM Client Error Types
#[derive(Error, Debug)]
pub enum FCMError {
    #[error("Failed to read service account key: {0}")]
    CredentialsError(String),

    #[error("Failed to parse private key: {0}")]
    KeyParseError(String),

    #[error("Failed to encode JWT: {0}")]
    JwtEncodeError(String),

    #[error("Failed to get access token: {0}")]
    TokenError(String),

    #[error("Token request failed with status: {0}")]
    TokenRequestFailed(String),

    #[error("Failed to parse token response: {0}")]
    TokenParseError(String),

    #[error("FCM send request failed: {0}")]
    SendRequestError(String),

    #[error("Failed to parse FCM response: {0}")]
    ResponseParseError(String),

    #[error("FCM API error: {status} ({code}) - {message}")]
    ApiError {
        status: u16,
        code: FcmErrorCode,
        message: String,
    },
}

impl FCMError {
    /// Error code reported for a single device when this error ends its delivery.
    pub fn code(&self) -> FcmErrorCode {
        match self {
            FCMError::ApiError { code, .. } => *code,
            FCMError::SendRequestError(_) => FcmErrorCode::ServerUnavailable,
            _ => FcmErrorCode::InternalError,
        }
    }
}

impl From<FCMError> for String {
    fn from(err: FCMError) -> Self {
        err.to_string()
    }
}

/// Provider error code for a single-device delivery.
///
/// Displayed in the `messaging/<code>` form used by the Firebase Admin SDKs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FcmErrorCode {
    InvalidRegistrationToken,
    RegistrationTokenNotRegistered,
    InvalidArgument,
    MismatchedCredential,
    MessageRateExceeded,
    ServerUnavailable,
    InternalError,
    ThirdPartyAuthError,
    Unknown,
}

impl FcmErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FcmErrorCode::InvalidRegistrationToken => "messaging/invalid-registration-token",
            FcmErrorCode::RegistrationTokenNotRegistered => {
                "messaging/registration-token-not-registered"
            }
            FcmErrorCode::InvalidArgument => "messaging/invalid-argument",
            FcmErrorCode::MismatchedCredential => "messaging/mismatched-credential",
            FcmErrorCode::MessageRateExceeded => "messaging/message-rate-exceeded",
            FcmErrorCode::ServerUnavailable => "messaging/server-unavailable",
            FcmErrorCode::InternalError => "messaging/internal-error",
            FcmErrorCode::ThirdPartyAuthError => "messaging/third-party-auth-error",
            FcmErrorCode::Unknown => "messaging/unknown-error",
        }
    }

    /// Parse either the `messaging/<code>` form or a raw FCM error name
    /// (HTTP v1 `errorCode`/`status`, or the legacy API names).
    pub fn parse(code: &str) -> Self {
        match code {
            "messaging/invalid-registration-token" | "InvalidRegistration" => {
                FcmErrorCode::InvalidRegistrationToken
            }
            "messaging/registration-token-not-registered" | "UNREGISTERED" | "NotRegistered" => {
                FcmErrorCode::RegistrationTokenNotRegistered
            }
            "messaging/invalid-argument" | "INVALID_ARGUMENT" => FcmErrorCode::InvalidArgument,
            "messaging/mismatched-credential" | "SENDER_ID_MISMATCH" | "MismatchSenderId" => {
                FcmErrorCode::MismatchedCredential
            }
            "messaging/message-rate-exceeded"
            | "QUOTA_EXCEEDED"
            | "RESOURCE_EXHAUSTED"
            | "MessageRateExceeded"
            | "DeviceMessageRateExceeded" => FcmErrorCode::MessageRateExceeded,
            "messaging/server-unavailable" | "UNAVAILABLE" | "Unavailable" => {
                FcmErrorCode::ServerUnavailable
            }
            "messaging/internal-error" | "INTERNAL" | "InternalServerError" => {
                FcmErrorCode::InternalError
            }
            "messaging/third-party-auth-error" | "THIRD_PARTY_AUTH_ERROR" => {
                FcmErrorCode::ThirdPartyAuthError
            }
            _ => FcmErrorCode::Unknown,
        }
    }

    /// Classify a failed HTTP v1 send from its status and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let Ok(envelope) = serde_json::from_str::<FcmApiErrorEnvelope>(body) else {
            return Self::from_status(status);
        };
        let error = envelope.error;

        let fcm_code = error
            .details
            .iter()
            .find(|d| {
                d.type_url
                    .as_deref()
                    .map(|t| t.ends_with("FcmError"))
                    .unwrap_or(false)
            })
            .and_then(|d| d.error_code.as_deref())
            .or(error.status.as_deref());

        let code = match fcm_code {
            Some(name) => Self::parse(name),
            None => return Self::from_status(status),
        };

        // FCM v1 reports malformed tokens as a generic INVALID_ARGUMENT
        if code == FcmErrorCode::InvalidArgument {
            let message = error.message.unwrap_or_default().to_lowercase();
            if message.contains("registration token") {
                return FcmErrorCode::InvalidRegistrationToken;
            }
        }

        code
    }

    fn from_status(status: u16) -> Self {
        match status {
            400 => FcmErrorCode::InvalidArgument,
            401 => FcmErrorCode::ThirdPartyAuthError,
            403 => FcmErrorCode::MismatchedCredential,
            429 => FcmErrorCode::MessageRateExceeded,
            500 => FcmErrorCode::InternalError,
            503 => FcmErrorCode::ServerUnavailable,
            _ => FcmErrorCode::Unknown,
        }
    }

    /// True when the provider has confirmed the token can never be delivered to again.
    pub fn is_permanent_token_error(&self) -> bool {
        matches!(
            self,
            FcmErrorCode::InvalidRegistrationToken | FcmErrorCode::RegistrationTokenNotRegistered
        )
    }
}

impl fmt::Display for FcmErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
