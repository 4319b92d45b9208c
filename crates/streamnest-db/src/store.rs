//! Store traits consumed by the authentication layer.
//!
//! The auth crate talks to persistence only through these traits, so the
//! full session state machine can run against the in-memory store in tests
//! while production wires in the PostgreSQL repositories.
//!
//! Callers pass identifiers (usernames, emails) already lowercase-normalized;
//! the stores match exactly and never re-normalize.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{DbAccount, NewAccount};

/// Persistence contract for account credential records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new account. Fails with [`crate::DbError::Duplicate`] when the
    /// username or email collides with an existing row - detected from the
    /// unique-index violation at write time, not by a prior read.
    async fn create(&self, account: NewAccount) -> DbResult<DbAccount>;

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbAccount>>;

    /// Find by email OR username.
    async fn find_by_identifier(&self, identifier: &str) -> DbResult<Option<DbAccount>>;

    async fn find_by_username(&self, username: &str) -> DbResult<Option<DbAccount>>;

    /// Set or clear the stored refresh token without touching other fields.
    async fn update_refresh_token(&self, id: Uuid, token: Option<&str>) -> DbResult<()>;

    /// Compare-and-swap the stored refresh token: replace it only if it still
    /// equals `expected`. Returns `false` when the stored value changed
    /// underneath us (concurrent rotation or logout).
    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> DbResult<bool>;

    /// Replace the password hash. Takes an already-hashed value.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> DbResult<()>;

    /// Append a content reference to the account's watch history.
    async fn append_watch_entry(&self, id: Uuid, content_id: Uuid) -> DbResult<()>;
}

/// Read-only view over subscription edges.
///
/// Edge creation and deletion belong to the relationship-management surface,
/// not to this core.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Number of edges where this account is the channel.
    async fn count_subscribers(&self, channel_id: Uuid) -> DbResult<u64>;

    /// Number of edges where this account is the subscriber.
    async fn count_subscribed_to(&self, subscriber_id: Uuid) -> DbResult<u64>;

    /// Whether `viewer_id` has an edge pointing at `channel_id`.
    async fn is_subscribed(&self, channel_id: Uuid, viewer_id: Uuid) -> DbResult<bool>;
}
