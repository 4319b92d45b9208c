//! Authentication configuration
//!
//! Centralized configuration for the account core. Secrets and TTLs are
//! injected here and passed to the services at construction; business logic
//! never reads process environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token signing configuration
    pub jwt: JwtConfig,
    /// Password hashing configuration
    pub password: PasswordConfig,
}

/// Token signing configuration.
///
/// Access and refresh tokens use distinct secrets, so a token of one kind
/// can never even pass signature verification where the other is expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing access tokens (should be at least 256 bits)
    pub access_secret: String,
    /// Secret key for signing refresh tokens (distinct from the access secret)
    pub refresh_secret: String,
    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,
    /// Token issuer claim
    pub issuer: String,
    /// Token audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),  // Must be set in production
            refresh_secret: String::new(), // Must be set in production
            access_token_lifetime: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_lifetime: Duration::from_secs(10 * 24 * 60 * 60), // 10 days
            issuer: "streamnest".to_string(),
            audience: "streamnest-api".to_string(),
        }
    }
}

/// Password hashing configuration (Argon2id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB (OWASP recommends 19456 KiB = 19 MiB minimum)
    pub memory_cost: u32,
    /// Time cost (iterations) - OWASP recommends 2 minimum
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
    /// Output hash length in bytes
    pub hash_length: u32,
    /// Minimum password length
    pub min_password_length: usize,
    /// Maximum password length (to prevent DoS)
    pub max_password_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            // OWASP recommended values for Argon2id
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
            hash_length: 32,
            min_password_length: 8,
            max_password_length: 128,
        }
    }
}

impl AuthConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(secret) = std::env::var("ACCESS_TOKEN_SECRET") {
            config.jwt.access_secret = secret;
        }
        if let Ok(secret) = std::env::var("REFRESH_TOKEN_SECRET") {
            config.jwt.refresh_secret = secret;
        }
        if let Ok(secs) = std::env::var("ACCESS_TOKEN_EXPIRY") {
            if let Ok(secs) = secs.parse() {
                config.jwt.access_token_lifetime = Duration::from_secs(secs);
            }
        }
        if let Ok(secs) = std::env::var("REFRESH_TOKEN_EXPIRY") {
            if let Ok(secs) = secs.parse() {
                config.jwt.refresh_token_lifetime = Duration::from_secs(secs);
            }
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            config.jwt.issuer = issuer;
        }

        config
    }

    /// Validate the configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.jwt.access_secret.is_empty() {
            errors.push("Access token secret must be set".to_string());
        } else if self.jwt.access_secret.len() < 32 {
            errors.push("Access token secret should be at least 256 bits (32 bytes)".to_string());
        }

        if self.jwt.refresh_secret.is_empty() {
            errors.push("Refresh token secret must be set".to_string());
        } else if self.jwt.refresh_secret.len() < 32 {
            errors.push("Refresh token secret should be at least 256 bits (32 bytes)".to_string());
        }

        if !self.jwt.access_secret.is_empty() && self.jwt.access_secret == self.jwt.refresh_secret {
            errors.push("Access and refresh token secrets must be distinct".to_string());
        }

        if self.jwt.refresh_token_lifetime <= self.jwt.access_token_lifetime {
            errors.push("Refresh token lifetime must exceed access token lifetime".to_string());
        }

        if self.password.memory_cost < 19456 {
            errors.push(
                "Argon2 memory cost should be at least 19456 KiB (OWASP recommendation)"
                    .to_string(),
            );
        }
        if self.password.time_cost < 2 {
            errors.push("Argon2 time cost should be at least 2 (OWASP recommendation)".to_string());
        }
        if self.password.min_password_length < 8 {
            errors.push("Minimum password length must be at least 8".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
