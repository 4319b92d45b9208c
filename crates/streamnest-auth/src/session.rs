//! Session Manager
//!
//! Orchestrates the login / refresh / logout state machine over the
//! credential store and the token service. Per account the states are:
//!
//! - **Anonymous**: no stored refresh token
//! - **Authenticated**: the single currently-valid refresh token is stored
//! - **Revoked**: logged out, stored token cleared
//!
//! The stored refresh token is the only mutable session state; every write
//! here fully replaces it. Rotation is a compare-and-swap against the
//! presented token, so replay of a stale token and concurrent rotation both
//! surface as [`AuthError::TokenMismatch`].

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

use streamnest_db::CredentialStore;

use crate::error::{AuthError, AuthResult};
use crate::jwt::TokenService;
use crate::password::PasswordService;
use crate::types::{
    AccountView, LoginOutcome, LoginRequest, LogoutOutcome, RefreshOutcome, SessionCookie,
    TokenPair, ACCESS_COOKIE, REFRESH_COOKIE,
};

/// Session service driving the login/refresh/logout transitions
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
    passwords: PasswordService,
}

impl SessionService {
    /// Create a new session service
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: TokenService,
        passwords: PasswordService,
    ) -> Self {
        Self {
            store,
            tokens,
            passwords,
        }
    }

    /// Anonymous -> Authenticated.
    ///
    /// Verifies credentials, issues a token pair, persists the refresh token
    /// and returns the sanitized account plus the cookies to set.
    pub async fn login(&self, request: &LoginRequest) -> AuthResult<LoginOutcome> {
        let identifier = request.identifier.trim().to_lowercase();

        let account = self
            .store
            .find_by_identifier(&identifier)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !self.passwords.verify(&request.password, &account.password_hash)? {
            info!(account_id = %account.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.tokens.issue_pair(&account)?;
        self.store
            .update_refresh_token(account.id, Some(&pair.refresh_token))
            .await?;

        info!(account_id = %account.id, "Login succeeded");

        Ok(LoginOutcome {
            account: AccountView::from(&account),
            cookies: self.session_cookies(&pair),
            tokens: pair,
        })
    }

    /// Authenticated -> Authenticated (rotated).
    ///
    /// A missing token is an error in its own right, checked before any
    /// verification. The presented token must match the stored value
    /// exactly; anything else is treated as reuse of a rotated token or a
    /// forgery.
    pub async fn refresh(&self, presented: Option<&str>) -> AuthResult<RefreshOutcome> {
        let presented = presented.ok_or(AuthError::MissingToken)?;

        let claims = self.tokens.verify_refresh(presented)?;
        let account_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let stored = match account.refresh_token.as_deref() {
            Some(stored) => stored,
            None => {
                warn!(account_id = %account.id, "Refresh for account with no live session");
                return Err(AuthError::TokenMismatch);
            }
        };

        if stored.as_bytes().ct_eq(presented.as_bytes()).unwrap_u8() == 0 {
            warn!(account_id = %account.id, "Presented refresh token does not match stored value");
            return Err(AuthError::TokenMismatch);
        }

        let pair = self.tokens.issue_pair(&account)?;

        // CAS against the token we just compared: if another request rotated
        // or cleared it in between, this request loses.
        let rotated = self
            .store
            .rotate_refresh_token(account.id, presented, &pair.refresh_token)
            .await?;
        if !rotated {
            warn!(account_id = %account.id, "Refresh token rotated concurrently");
            return Err(AuthError::TokenMismatch);
        }

        info!(account_id = %account.id, "Refresh token rotated");

        Ok(RefreshOutcome {
            cookies: self.session_cookies(&pair),
            tokens: pair,
        })
    }

    /// Authenticated -> Revoked. Idempotent: logging out twice is not an
    /// error, the stored token is simply already cleared.
    pub async fn logout(&self, account_id: Uuid) -> AuthResult<LogoutOutcome> {
        self.store.update_refresh_token(account_id, None).await?;

        info!(account_id = %account_id, "Logged out");

        Ok(LogoutOutcome {
            cookies: vec![
                SessionCookie::clear(ACCESS_COOKIE),
                SessionCookie::clear(REFRESH_COOKIE),
            ],
        })
    }

    /// Verify the current password and replace it with a new one
    /// (hash-on-write).
    pub async fn change_password(
        &self,
        account_id: Uuid,
        current: &str,
        new: &str,
    ) -> AuthResult<()> {
        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !self.passwords.verify(current, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.passwords.validate_strength(new)?;
        let password_hash = self.passwords.hash(new)?;
        self.store.update_password(account_id, &password_hash).await?;

        info!(account_id = %account_id, "Password changed");

        Ok(())
    }

    fn session_cookies(&self, pair: &TokenPair) -> Vec<SessionCookie> {
        let config = self.tokens.config();
        vec![
            SessionCookie::set(
                ACCESS_COOKIE,
                pair.access_token.clone(),
                config.access_token_lifetime.as_secs() as i64,
            ),
            SessionCookie::set(
                REFRESH_COOKIE,
                pair.refresh_token.clone(),
                config.refresh_token_lifetime.as_secs() as i64,
            ),
        ]
    }
}
