//! Core authentication types
//!
//! Shared types used across the account backend: token claims, the
//! sanitized account projection, channel profiles, cookie transport values,
//! and the request/outcome shapes for each operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use streamnest_db::DbAccount;

use crate::media::StagedAsset;

// =============================================================================
// Token Types
// =============================================================================

/// Token kind tag carried inside every claim set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by an access token: enough identity to authorize a request
/// without a database roundtrip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (account ID)
    pub sub: String,
    /// Token kind tag
    pub token_type: TokenKind,
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID (unique identifier)
    pub jti: String,
}

/// Claims carried by a refresh token: the account identifier and nothing
/// else. A leaked refresh token cannot impersonate the identity claims a
/// protected resource expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (account ID)
    pub sub: String,
    /// Token kind tag
    pub token_type: TokenKind,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID (unique identifier)
    pub jti: String,
}

/// Signed token pair (access + refresh)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Access token expiry (Unix timestamp)
    pub access_expires_at: i64,
    /// Refresh token expiry (Unix timestamp)
    pub refresh_expires_at: i64,
    /// Token type (always "Bearer")
    pub token_type: String,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_at: i64,
        refresh_expires_at: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
            token_type: "Bearer".to_string(),
        }
    }
}

// =============================================================================
// Account Projections
// =============================================================================

/// Sanitized account projection: the only account shape ever returned to a
/// client. Excludes `password_hash` and `refresh_token` by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub watch_history: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&DbAccount> for AccountView {
    fn from(account: &DbAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            avatar_url: account.avatar_url.clone(),
            cover_image_url: account.cover_image_url.clone(),
            watch_history: account.watch_history.clone(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

impl From<DbAccount> for AccountView {
    fn from(account: DbAccount) -> Self {
        Self::from(&account)
    }
}

/// Channel profile with subscription aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelProfile {
    pub full_name: String,
    pub username: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    /// Count of subscription edges pointing at this channel
    pub subscribers_count: u64,
    /// Count of channels this account subscribes to
    pub subscribed_to_count: u64,
    /// Whether the viewer subscribes to this channel
    pub is_subscribed: bool,
}

// =============================================================================
// Cookie Transport
// =============================================================================

/// Cookie name carrying the access token
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie name carrying the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// A cookie value the transport layer writes to the response.
///
/// The core decides the semantics (always secure + http-only); actually
/// setting or clearing response headers belongs to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionCookie {
    pub name: &'static str,
    pub value: String,
    pub http_only: bool,
    pub secure: bool,
    pub path: &'static str,
    /// `Some(secs)` sets an expiry; `None` clears the cookie
    pub max_age_secs: Option<i64>,
}

impl SessionCookie {
    /// Cookie that installs a token on the client
    pub fn set(name: &'static str, value: String, max_age_secs: i64) -> Self {
        Self {
            name,
            value,
            http_only: true,
            secure: true,
            path: "/",
            max_age_secs: Some(max_age_secs),
        }
    }

    /// Cookie that clears a previously set token
    pub fn clear(name: &'static str) -> Self {
        Self {
            name,
            value: String::new(),
            http_only: true,
            secure: true,
            path: "/",
            max_age_secs: None,
        }
    }
}

// =============================================================================
// Request / Outcome Types
// =============================================================================

/// Registration request, with media already staged on local disk
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    /// Required avatar asset
    pub avatar: Option<StagedAsset>,
    /// Optional cover image asset
    pub cover_image: Option<StagedAsset>,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email address or username
    pub identifier: String,
    /// Plaintext password, verified against the stored hash
    pub password: String,
}

/// Successful login: sanitized account, tokens, and the cookies to set
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub account: AccountView,
    pub tokens: TokenPair,
    pub cookies: Vec<SessionCookie>,
}

/// Successful refresh: rotated tokens and the cookies to set
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub tokens: TokenPair,
    pub cookies: Vec<SessionCookie>,
}

/// Successful logout: the cookies to clear
#[derive(Debug, Clone, Serialize)]
pub struct LogoutOutcome {
    pub cookies: Vec<SessionCookie>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_db_account() -> DbAccount {
        let now = Utc::now();
        DbAccount {
            id: Uuid::new_v4(),
            username: "ana".to_string(),
            email: "ana@x.com".to_string(),
            full_name: "Ana".to_string(),
            password_hash: "$argon2id$secret-material".to_string(),
            avatar_url: "https://cdn.example.com/a.png".to_string(),
            cover_image_url: None,
            refresh_token: Some("live-refresh-token".to_string()),
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_account_view_strips_credentials() {
        let view = AccountView::from(sample_db_account());
        let json = serde_json::to_value(&view).unwrap();

        let object = json.as_object().unwrap();
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("refresh_token"));
        assert_eq!(object["username"], "ana");
    }

    #[test]
    fn test_session_cookie_semantics() {
        let cookie = SessionCookie::set(ACCESS_COOKIE, "token".to_string(), 900);
        assert!(cookie.http_only);
        assert!(cookie.secure);
        assert_eq!(cookie.max_age_secs, Some(900));

        let cleared = SessionCookie::clear(REFRESH_COOKIE);
        assert!(cleared.http_only);
        assert!(cleared.secure);
        assert!(cleared.value.is_empty());
        assert_eq!(cleared.max_age_secs, None);
    }

    #[test]
    fn test_token_pair_bearer() {
        let pair = TokenPair::new("a".to_string(), "r".to_string(), 1, 2);
        assert_eq!(pair.token_type, "Bearer");
    }
}
