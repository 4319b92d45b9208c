//! In-memory store for tests.
//!
//! Implements the same traits as the PostgreSQL repositories so the auth
//! layer's state machine can be exercised without a running database. Gated
//! behind the `mock` feature.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{DbAccount, DbSubscription, NewAccount};
use crate::store::{CredentialStore, SubscriptionStore};

/// In-memory account + subscription store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    accounts: Arc<RwLock<HashMap<Uuid, DbAccount>>>,
    subscriptions: Arc<RwLock<Vec<DbSubscription>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a subscription edge. Edge creation is outside the auth core, so
    /// tests use this to arrange relationship state directly.
    pub async fn add_subscription(&self, subscriber_id: Uuid, channel_id: Uuid) {
        let now = Utc::now();
        self.subscriptions.write().await.push(DbSubscription {
            id: Uuid::new_v4(),
            subscriber_id,
            channel_id,
            created_at: now,
            updated_at: now,
        });
    }

    /// Direct row access for assertions.
    pub async fn get(&self, id: Uuid) -> Option<DbAccount> {
        self.accounts.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create(&self, account: NewAccount) -> DbResult<DbAccount> {
        let mut accounts = self.accounts.write().await;

        if accounts.values().any(|a| a.username == account.username) {
            return Err(DbError::Duplicate(format!(
                "Username {} already exists",
                account.username
            )));
        }
        if accounts.values().any(|a| a.email == account.email) {
            return Err(DbError::Duplicate(format!(
                "Email {} already exists",
                account.email
            )));
        }

        let now = Utc::now();
        let row = DbAccount {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            password_hash: account.password_hash,
            avatar_url: account.avatar_url,
            cover_image_url: account.cover_image_url,
            refresh_token: None,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        accounts.insert(row.id, row.clone());

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbAccount>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> DbResult<Option<DbAccount>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == identifier || a.username == identifier)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<DbAccount>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn update_refresh_token(&self, id: Uuid, token: Option<&str>) -> DbResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("Account {} not found", id)))?;

        account.refresh_token = token.map(|t| t.to_string());
        account.updated_at = Utc::now();

        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> DbResult<bool> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("Account {} not found", id)))?;

        if account.refresh_token.as_deref() != Some(expected) {
            return Ok(false);
        }

        account.refresh_token = Some(replacement.to_string());
        account.updated_at = Utc::now();

        Ok(true)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> DbResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("Account {} not found", id)))?;

        account.password_hash = password_hash.to_string();
        account.updated_at = Utc::now();

        Ok(())
    }

    async fn append_watch_entry(&self, id: Uuid, content_id: Uuid) -> DbResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("Account {} not found", id)))?;

        account.watch_history.push(content_id);
        account.updated_at = Utc::now();

        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn count_subscribers(&self, channel_id: Uuid) -> DbResult<u64> {
        Ok(self
            .subscriptions
            .read()
            .await
            .iter()
            .filter(|s| s.channel_id == channel_id)
            .count() as u64)
    }

    async fn count_subscribed_to(&self, subscriber_id: Uuid) -> DbResult<u64> {
        Ok(self
            .subscriptions
            .read()
            .await
            .iter()
            .filter(|s| s.subscriber_id == subscriber_id)
            .count() as u64)
    }

    async fn is_subscribed(&self, channel_id: Uuid, viewer_id: Uuid) -> DbResult<bool> {
        Ok(self
            .subscriptions
            .read()
            .await
            .iter()
            .any(|s| s.channel_id == channel_id && s.subscriber_id == viewer_id))
    }
}
