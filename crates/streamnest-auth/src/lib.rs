//! StreamNest Authentication Core
//!
//! Account backend for the StreamNest platform supporting:
//!
//! - **Registration**: validated input, staged-media upload, credential
//!   record creation
//! - **JWT Sessions**: access tokens + refresh tokens with rotation, carried
//!   as secure http-only cookies
//! - **Password Security**: Argon2id hashing (OWASP recommended)
//! - **Profiles**: channel profiles with subscriber aggregates and watch
//!   history
//!
//! # Security Features
//!
//! - Distinct signing secrets per token kind: a refresh token is never
//!   accepted as an access credential, nor the reverse
//! - Single stored refresh token per account, replaced by compare-and-swap
//!   on every rotation; stale-token replay surfaces as a mismatch
//! - Sanitized account projections: credential material never leaves the core
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Account Flows                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  register ─▶ RegistrationService ──▶ MediaStorage            │
//! │                      │                                       │
//! │  login/refresh ─▶ SessionService ──▶ TokenService            │
//! │  /logout             │                PasswordService        │
//! │                      ▼                                       │
//! │               CredentialStore                                │
//! │                                                              │
//! │  channel profile ─▶ ProfileService ─▶ SubscriptionStore      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod jwt;
pub mod media;
pub mod password;
pub mod profile;
pub mod registration;
pub mod session;
pub mod types;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult, ErrorResponse};
pub use jwt::TokenService;
pub use media::{MediaStorage, StagedAsset, UploadedMedia};
pub use password::PasswordService;
pub use profile::ProfileService;
pub use registration::RegistrationService;
pub use session::SessionService;
pub use types::*;

use std::sync::Arc;

use streamnest_db::{CredentialStore, SubscriptionStore};

/// Main authentication service combining all account components
#[derive(Clone)]
pub struct AuthService {
    pub passwords: PasswordService,
    pub tokens: TokenService,
    pub sessions: SessionService,
    pub registration: RegistrationService,
    pub profiles: ProfileService,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new auth service with all components
    pub fn new(
        store: Arc<dyn CredentialStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        media: Arc<dyn MediaStorage>,
        config: AuthConfig,
    ) -> Self {
        let passwords = PasswordService::new(config.password.clone());
        let tokens = TokenService::new(config.jwt.clone());
        let sessions = SessionService::new(store.clone(), tokens.clone(), passwords.clone());
        let registration = RegistrationService::new(store.clone(), media, passwords.clone());
        let profiles = ProfileService::new(store, subscriptions);

        Self {
            passwords,
            tokens,
            sessions,
            registration,
            profiles,
            config,
        }
    }

    /// Get the config reference
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}
