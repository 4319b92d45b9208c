//! Database models - mapped from PostgreSQL tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Account Models
// ============================================================================

/// A full account row, including credential material.
///
/// Never serialized to a client as-is; see the sanitized projections in the
/// auth layer.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbAccount {
    pub id: Uuid,
    /// Lowercase-normalized, unique
    pub username: String,
    /// Lowercase-normalized, unique
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    /// The single currently-valid refresh token, if a session is live.
    /// Replaced on every refresh, cleared on logout.
    pub refresh_token: Option<String>,
    /// Ordered content references, oldest first
    pub watch_history: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a new account.
///
/// `username` and `email` must already be lowercase-normalized and
/// `password_hash` must already be hashed - the store never sees plaintext.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
}

// ============================================================================
// Subscription Models
// ============================================================================

/// Directed subscriber -> channel edge.
///
/// No uniqueness is enforced on (subscriber_id, channel_id); counts derived
/// from these rows are counts of edges, not of distinct subscribers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbSubscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
