//! Token Service
//!
//! Issues and verifies the signed, time-limited token pair that carries a
//! session:
//! - Access tokens (short-lived) carry identity claims for authorizing
//!   individual requests
//! - Refresh tokens (long-lived) carry only the account identifier and are
//!   accepted solely by the refresh transition
//!
//! The two kinds are signed with distinct secrets, so neither can ever pass
//! verification where the other is expected, independent of the claim-set
//! differences.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use streamnest_db::DbAccount;

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::types::{AccessClaims, RefreshClaims, TokenKind, TokenPair};

/// Token service for issuing and verifying the session token pair
#[derive(Clone)]
pub struct TokenService {
    config: JwtConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenService {
    /// Create a new token service
    pub fn new(config: JwtConfig) -> Self {
        let access_encoding = EncodingKey::from_secret(config.access_secret.as_bytes());
        let access_decoding = DecodingKey::from_secret(config.access_secret.as_bytes());
        let refresh_encoding = EncodingKey::from_secret(config.refresh_secret.as_bytes());
        let refresh_decoding = DecodingKey::from_secret(config.refresh_secret.as_bytes());

        Self {
            config,
            access_encoding,
            access_decoding,
            refresh_encoding,
            refresh_decoding,
        }
    }

    /// Signing configuration in use
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issue an access token carrying the account's identity claims
    pub fn issue_access_token(&self, account: &DbAccount) -> AuthResult<String> {
        let now = Utc::now();
        let exp = now
            + Duration::from_std(self.config.access_token_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let claims = AccessClaims {
            sub: account.id.to_string(),
            token_type: TokenKind::Access,
            username: account.username.clone(),
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to encode access token: {}", e)))
    }

    /// Issue a refresh token carrying only the account identifier
    pub fn issue_refresh_token(&self, account: &DbAccount) -> AuthResult<String> {
        let now = Utc::now();
        let exp = now
            + Duration::from_std(self.config.refresh_token_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let claims = RefreshClaims {
            sub: account.id.to_string(),
            token_type: TokenKind::Refresh,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to encode refresh token: {}", e)))
    }

    /// Issue a fresh access + refresh pair for the account
    pub fn issue_pair(&self, account: &DbAccount) -> AuthResult<TokenPair> {
        let now = Utc::now();
        let access_exp = now
            + Duration::from_std(self.config.access_token_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;
        let refresh_exp = now
            + Duration::from_std(self.config.refresh_token_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(TokenPair::new(
            self.issue_access_token(account)?,
            self.issue_refresh_token(account)?,
            access_exp.timestamp(),
            refresh_exp.timestamp(),
        ))
    }

    /// Verify an access token and return its claims
    pub fn verify_access(&self, token: &str) -> AuthResult<AccessClaims> {
        let token_data =
            decode::<AccessClaims>(token, &self.access_decoding, &self.validation())?;

        if token_data.claims.token_type != TokenKind::Access {
            return Err(AuthError::InvalidTokenType);
        }

        Ok(token_data.claims)
    }

    /// Verify a refresh token and return its claims
    pub fn verify_refresh(&self, token: &str) -> AuthResult<RefreshClaims> {
        let token_data =
            decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation())?;

        if token_data.claims.token_type != TokenKind::Refresh {
            return Err(AuthError::InvalidTokenType);
        }

        Ok(token_data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: "access-secret-for-tests-min-32-bytes!!".to_string(),
            refresh_secret: "refresh-secret-for-tests-min-32-byte!".to_string(),
            access_token_lifetime: StdDuration::from_secs(900),
            refresh_token_lifetime: StdDuration::from_secs(864000),
            issuer: "test-issuer".to_string(),
            audience: "test-audience".to_string(),
        }
    }

    fn test_account() -> DbAccount {
        let now = Utc::now();
        DbAccount {
            id: Uuid::new_v4(),
            username: "ana".to_string(),
            email: "ana@x.com".to_string(),
            full_name: "Ana".to_string(),
            password_hash: "$argon2id$irrelevant".to_string(),
            avatar_url: "https://cdn.example.com/a.png".to_string(),
            cover_image_url: None,
            refresh_token: None,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_pair() {
        let service = TokenService::new(test_config());
        let pair = service.issue_pair(&test_account()).unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_ne!(pair.access_token, pair.refresh_token);
        assert_eq!(pair.token_type, "Bearer");
        assert!(pair.refresh_expires_at > pair.access_expires_at);
    }

    #[test]
    fn test_verify_access_claims() {
        let service = TokenService::new(test_config());
        let account = test_account();
        let token = service.issue_access_token(&account).unwrap();

        let claims = service.verify_access(&token).unwrap();
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.username, "ana");
        assert_eq!(claims.email, "ana@x.com");
        assert_eq!(claims.full_name, "Ana");
        assert_eq!(claims.token_type, TokenKind::Access);
    }

    #[test]
    fn test_refresh_claims_carry_only_identifier() {
        let service = TokenService::new(test_config());
        let account = test_account();
        let token = service.issue_refresh_token(&account).unwrap();

        let claims = service.verify_refresh(&token).unwrap();
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.token_type, TokenKind::Refresh);
    }

    #[test]
    fn test_kind_separation() {
        let service = TokenService::new(test_config());
        let pair = service.issue_pair(&test_account()).unwrap();

        // Access token where a refresh token is expected: rejected at the
        // signature level because the secrets differ.
        assert!(matches!(
            service.verify_refresh(&pair.access_token),
            Err(AuthError::InvalidToken)
        ));

        // And the reverse.
        assert!(matches!(
            service.verify_access(&pair.refresh_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new(test_config());
        let account = test_account();

        // Hand-build a token that expired well past the default leeway
        let now = Utc::now();
        let claims = AccessClaims {
            sub: account.id.to_string(),
            token_type: TokenKind::Access,
            username: account.username.clone(),
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            iat: now.timestamp() - 7200,
            exp: now.timestamp() - 3600,
            nbf: now.timestamp() - 7200,
            iss: "test-issuer".to_string(),
            aud: "test-audience".to_string(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(test_config().access_secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.verify_access(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = TokenService::new(test_config());
        assert!(matches!(
            service.verify_access("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let service = TokenService::new(test_config());
        let token = service.issue_access_token(&test_account()).unwrap();

        let mut forged = token.clone();
        forged.pop();
        forged.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(service.verify_access(&forged).is_err());
    }

    #[test]
    fn test_issued_tokens_differ_per_call() {
        let service = TokenService::new(test_config());
        let account = test_account();

        // Fresh jti per issue means rotation always changes the text
        let first = service.issue_pair(&account).unwrap();
        let second = service.issue_pair(&account).unwrap();
        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }
}
