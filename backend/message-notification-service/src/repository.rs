/// Recipient storage
///
/// Users live in the `users` table; `notification_tokens` is a nullable
/// `TEXT[]` holding the registered device tokens in registration order.
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::UserRecord;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier
    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// Remove every occurrence of `tokens` from the user's token list,
    /// keeping the order of the tokens that remain.
    async fn remove_notification_tokens(&self, user_id: &str, tokens: &[String]) -> Result<()>;
}

/// Create the Postgres pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        "Database pool created"
    );
    Ok(pool)
}

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, notification_tokens FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn remove_notification_tokens(&self, user_id: &str, tokens: &[String]) -> Result<()> {
        // Filtering server-side keeps tokens registered after our read
        let query = r#"
            UPDATE users
            SET notification_tokens = ARRAY(
                SELECT t
                FROM unnest(notification_tokens) WITH ORDINALITY AS u(t, ord)
                WHERE NOT (t = ANY($2))
                ORDER BY ord
            )
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(tokens.to_vec())
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::RecipientNotFound(user_id.to_string()));
        }

        debug!(user_id, removed = tokens.len(), "Notification tokens updated");
        Ok(())
    }
}
