//! Profile Aggregator
//!
//! Read-side queries over accounts and subscription edges: the public
//! channel profile with subscriber aggregates, and the viewer's watch
//! history.

use std::sync::Arc;

use uuid::Uuid;

use streamnest_db::{CredentialStore, SubscriptionStore};

use crate::error::{AuthError, AuthResult};
use crate::types::ChannelProfile;

/// Profile service
#[derive(Clone)]
pub struct ProfileService {
    accounts: Arc<dyn CredentialStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl ProfileService {
    /// Create a new profile service
    pub fn new(
        accounts: Arc<dyn CredentialStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
    ) -> Self {
        Self {
            accounts,
            subscriptions,
        }
    }

    /// Aggregate a channel's public profile.
    ///
    /// Counts are counts of edges: with no uniqueness enforced on
    /// subscriber/channel pairs, a duplicated edge counts twice.
    pub async fn channel_profile(
        &self,
        channel_username: &str,
        viewer: Option<Uuid>,
    ) -> AuthResult<ChannelProfile> {
        let username = channel_username.trim().to_lowercase();

        let account = self
            .accounts
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let subscribers_count = self.subscriptions.count_subscribers(account.id).await?;
        let subscribed_to_count = self.subscriptions.count_subscribed_to(account.id).await?;
        let is_subscribed = match viewer {
            Some(viewer_id) => self.subscriptions.is_subscribed(account.id, viewer_id).await?,
            None => false,
        };

        Ok(ChannelProfile {
            full_name: account.full_name,
            username: account.username,
            avatar_url: account.avatar_url,
            cover_image_url: account.cover_image_url,
            subscribers_count,
            subscribed_to_count,
            is_subscribed,
        })
    }

    /// Ordered content references the account has watched
    pub async fn watch_history(&self, account_id: Uuid) -> AuthResult<Vec<Uuid>> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        Ok(account.watch_history)
    }

    /// Append a content reference to the account's watch history
    pub async fn record_watch(&self, account_id: Uuid, content_id: Uuid) -> AuthResult<()> {
        self.accounts.append_watch_entry(account_id, content_id).await?;
        Ok(())
    }
}
