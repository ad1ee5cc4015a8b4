/// FCM Shared Library
///
/// Firebase Cloud Messaging (FCM) client used by the chat backend to deliver
/// push notifications to registered devices.
///
/// It handles:
/// - OAuth2 token generation using Google service accounts
/// - Token caching with automatic refresh
/// - Single-device and order-preserving multi-device delivery
/// - Classification of provider error codes

pub mod client;
pub mod errors;
pub mod models;

pub use client::FCMClient;
pub use errors::{FCMError, FcmErrorCode};
pub use models::{FCMSendResult, FcmSendError, MulticastSendResult, Notification, ServiceAccountKey};
