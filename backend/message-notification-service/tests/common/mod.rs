#![allow(dead_code)]

use async_trait::async_trait;
use message_notification_service::models::{
    DeliveryResult, Message, MessageCreatedEvent, MessagePath, NotificationPayload, UserRecord,
};
use message_notification_service::{AppError, PushGateway, Result, UserRepository};
use mockall::mock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

mock! {
    pub Push {}

    #[async_trait]
    impl PushGateway for Push {
        async fn send_to_devices(
            &self,
            tokens: &[String],
            payload: &NotificationPayload,
        ) -> Result<Vec<DeliveryResult>>;
    }
}

/// In-memory user store applying token removal against the current record
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<String, UserRecord>>,
    writes: AtomicUsize,
    fail_writes: bool,
}

impl InMemoryUsers {
    pub fn with_user(id: &str, tokens: Option<&[&str]>) -> Self {
        let users = Self::default();
        users.insert(id, tokens);
        users
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn insert(&self, id: &str, tokens: Option<&[&str]>) {
        self.users.lock().unwrap().insert(
            id.to_string(),
            UserRecord {
                id: id.to_string(),
                notification_tokens: tokens.map(|t| t.iter().map(|s| s.to_string()).collect()),
            },
        );
    }

    /// Simulates a device registering while a dispatch is in flight
    pub fn register_token(&self, id: &str, token: &str) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(id) {
            user.notification_tokens
                .get_or_insert_with(Vec::new)
                .push(token.to_string());
        }
    }

    pub fn tokens(&self, id: &str) -> Option<Vec<String>> {
        self.users
            .lock()
            .unwrap()
            .get(id)
            .and_then(|u| u.notification_tokens.clone())
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    async fn remove_notification_tokens(&self, user_id: &str, tokens: &[String]) -> Result<()> {
        if self.fail_writes {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::RecipientNotFound(user_id.to_string()))?;

        if let Some(current) = user.notification_tokens.as_mut() {
            current.retain(|t| !tokens.contains(t));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn message_event(to: &str, content: &str) -> MessageCreatedEvent {
    MessageCreatedEvent {
        path: MessagePath {
            chat_id: "chat-1".to_string(),
            thread_id: "chat-1-thread".to_string(),
            message_id: "1700000000000".to_string(),
        },
        message: Message {
            to: to.to_string(),
            from: Some("sender".to_string()),
            content: Some(content.to_string()),
        },
    }
}
