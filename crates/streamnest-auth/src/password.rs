//! Password Service
//!
//! Credential hashing using Argon2id (OWASP recommended) with a fixed work
//! factor from configuration. Hashing embeds a random salt, so two hashes of
//! the same input differ; verification is constant-time inside argon2.
//!
//! Plaintext passwords never appear in logs, and transient copies are
//! zeroized on drop.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use zeroize::Zeroizing;

use crate::config::PasswordConfig;
use crate::error::{AuthError, AuthResult};

/// Symbols accepted as the required special character
const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Password service for hashing and verification
#[derive(Clone)]
pub struct PasswordService {
    config: PasswordConfig,
}

impl PasswordService {
    /// Create a new password service
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    /// Hash a password using Argon2id.
    ///
    /// Strength policy is NOT applied here; callers validate at the boundary
    /// with [`Self::validate_strength`] before a hash is ever computed.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let plaintext = Zeroizing::new(password.to_string());

        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(
            self.config.memory_cost,
            self.config.time_cost,
            self.config.parallelism,
            Some(self.config.hash_length as usize),
        )
        .map_err(|e| AuthError::Internal(format!("Invalid Argon2 params: {}", e)))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| AuthError::PasswordHashingFailed)?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`, never an error; only a malformed stored
    /// hash produces one.
    pub fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let plaintext = Zeroizing::new(password.to_string());

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AuthError::Internal("Stored password hash is malformed".to_string()))?;

        let argon2 = Argon2::default();
        match argon2.verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }

    /// Validate password strength, collecting every violation.
    ///
    /// Policy: at least `min_password_length` characters, one digit, one
    /// lowercase letter, one uppercase letter, and one symbol from
    /// [`PASSWORD_SYMBOLS`].
    pub fn validate_strength(&self, password: &str) -> AuthResult<()> {
        let mut errors = Vec::new();

        if password.len() < self.config.min_password_length {
            errors.push(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            ));
        }

        if password.len() > self.config.max_password_length {
            errors.push(format!(
                "Password must be at most {} characters",
                self.config.max_password_length
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one digit".to_string());
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }

        if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
            errors.push(format!(
                "Password must contain at least one symbol from {}",
                PASSWORD_SYMBOLS
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PasswordConfig {
        PasswordConfig {
            // Use lower values for tests to be fast
            memory_cost: 4096,
            time_cost: 1,
            parallelism: 1,
            hash_length: 32,
            min_password_length: 8,
            max_password_length: 128,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::new(test_config());
        let password = "Str0ng!Pass";

        let hash = service.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, password);

        // Correct password should verify
        assert!(service.verify(password, &hash).unwrap());

        // Wrong password should not verify, without erroring
        assert!(!service.verify("wrongpassword", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let service = PasswordService::new(test_config());
        let password = "Str0ng!Pass";

        let hash1 = service.hash(password).unwrap();
        let hash2 = service.hash(password).unwrap();

        // Random salt per call
        assert_ne!(hash1, hash2);

        assert!(service.verify(password, &hash1).unwrap());
        assert!(service.verify(password, &hash2).unwrap());
    }

    #[test]
    fn test_malformed_hash_errors() {
        let service = PasswordService::new(test_config());
        assert!(service.verify("whatever", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_strength_policy() {
        let service = PasswordService::new(test_config());

        assert!(service.validate_strength("Str0ng!Pass").is_ok());

        // Too short
        assert!(service.validate_strength("S0!a").is_err());

        // Missing digit
        assert!(service.validate_strength("Strong!Pass").is_err());

        // Missing lowercase
        assert!(service.validate_strength("STR0NG!PASS").is_err());

        // Missing uppercase
        assert!(service.validate_strength("str0ng!pass").is_err());

        // Missing symbol
        assert!(service.validate_strength("Str0ngPass").is_err());
    }

    #[test]
    fn test_strength_collects_all_violations() {
        let service = PasswordService::new(test_config());

        let err = service.validate_strength("abc").unwrap_err();
        match err {
            AuthError::Validation(violations) => {
                // short + no digit + no uppercase + no symbol
                assert_eq!(violations.len(), 4);
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }
}
