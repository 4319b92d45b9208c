//! Subscription repository (read path)

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::store::SubscriptionStore;

/// Read-only queries over subscription edges.
pub struct SubscriptionRepo {
    pool: PgPool,
}

impl SubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepo {
    async fn count_subscribers(&self, channel_id: Uuid) -> DbResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn count_subscribed_to(&self, subscriber_id: Uuid) -> DbResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1")
                .bind(subscriber_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn is_subscribed(&self, channel_id: Uuid, viewer_id: Uuid) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE channel_id = $1 AND subscriber_id = $2)",
        )
        .bind(channel_id)
        .bind(viewer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
