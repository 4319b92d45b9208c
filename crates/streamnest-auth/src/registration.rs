//! Registration Workflow
//!
//! Validates input in a fixed order, probes uniqueness, hands staged media
//! to the upload collaborator and creates the credential record. Staged
//! local files are released on every exit path; the unique indexes on the
//! accounts table remain the safety net for concurrent identical requests.

use std::sync::Arc;

use tracing::info;

use streamnest_db::{CredentialStore, NewAccount};

use crate::error::{AuthError, AuthResult};
use crate::media::{self, MediaStorage, StagedAsset};
use crate::password::PasswordService;
use crate::types::{AccountView, RegisterRequest};

/// Registration service
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn CredentialStore>,
    media: Arc<dyn MediaStorage>,
    passwords: PasswordService,
}

impl RegistrationService {
    /// Create a new registration service
    pub fn new(
        store: Arc<dyn CredentialStore>,
        media: Arc<dyn MediaStorage>,
        passwords: PasswordService,
    ) -> Self {
        Self {
            store,
            media,
            passwords,
        }
    }

    /// Register a new account.
    ///
    /// Validation order: required fields -> email shape -> password policy ->
    /// uniqueness -> avatar presence -> uploads -> insert. On any failure the
    /// staged files that were not consumed by an upload are released.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AccountView> {
        let staged: Vec<StagedAsset> = request
            .avatar
            .iter()
            .chain(request.cover_image.iter())
            .cloned()
            .collect();

        let result = self.register_inner(request).await;

        if result.is_err() {
            // Upload implementations delete what they touched; this sweeps up
            // whatever never reached an upload. Already-deleted files are fine.
            for asset in &staged {
                media::release_staged(asset).await;
            }
        }

        result
    }

    async fn register_inner(&self, request: RegisterRequest) -> AuthResult<AccountView> {
        let mut violations = Vec::new();
        if request.username.trim().is_empty() {
            violations.push("username is required".to_string());
        }
        if request.email.trim().is_empty() {
            violations.push("email is required".to_string());
        }
        if request.full_name.trim().is_empty() {
            violations.push("full name is required".to_string());
        }
        if request.password.is_empty() {
            violations.push("password is required".to_string());
        }
        if !violations.is_empty() {
            return Err(AuthError::Validation(violations));
        }

        if !request.email.contains('@') {
            return Err(AuthError::Validation(vec![
                "email must contain '@'".to_string()
            ]));
        }

        self.passwords.validate_strength(&request.password)?;

        let username = request.username.trim().to_lowercase();
        let email = request.email.trim().to_lowercase();

        // Early conflict probe for a friendly error; the insert below still
        // hits the unique indexes if a concurrent request wins the race.
        if self.store.find_by_identifier(&email).await?.is_some()
            || self.store.find_by_identifier(&username).await?.is_some()
        {
            return Err(AuthError::Conflict(
                "An account with this email or username already exists".to_string(),
            ));
        }

        let avatar = request
            .avatar
            .as_ref()
            .ok_or_else(|| AuthError::Validation(vec!["avatar image is required".to_string()]))?;

        let avatar_media = self
            .media
            .upload(avatar)
            .await?
            .ok_or_else(|| AuthError::Upload("Avatar upload did not return a usable URL".to_string()))?;

        // The cover image is optional, and so is its upload succeeding
        let cover_image_url = match &request.cover_image {
            Some(asset) => self.media.upload(asset).await?.map(|m| m.url),
            None => None,
        };

        let password_hash = self.passwords.hash(&request.password)?;

        let account = self
            .store
            .create(NewAccount {
                username,
                email,
                full_name: request.full_name.trim().to_string(),
                password_hash,
                avatar_url: avatar_media.url,
                cover_image_url,
            })
            .await?;

        info!(account_id = %account.id, username = %account.username, "Account registered");

        Ok(AccountView::from(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;

    use streamnest_db::mock::MemoryStore;

    use crate::config::PasswordConfig;
    use crate::media::UploadedMedia;

    const PASSWORD: &str = "Str0ng!Pass";

    /// Upload double honoring the staged-file contract: the file is deleted
    /// whether the upload succeeds or not.
    struct FakeMedia {
        fail: bool,
    }

    #[async_trait]
    impl MediaStorage for FakeMedia {
        async fn upload(&self, asset: &StagedAsset) -> AuthResult<Option<UploadedMedia>> {
            media::release_staged(asset).await;
            if self.fail {
                return Ok(None);
            }
            let name = asset
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            Ok(Some(UploadedMedia {
                url: format!("https://cdn.example.com/{}", name),
                bytes: Some(4),
            }))
        }
    }

    fn test_password_config() -> PasswordConfig {
        PasswordConfig {
            memory_cost: 4096,
            time_cost: 1,
            parallelism: 1,
            hash_length: 32,
            min_password_length: 8,
            max_password_length: 128,
        }
    }

    fn service(store: MemoryStore, fail_uploads: bool) -> RegistrationService {
        RegistrationService::new(
            Arc::new(store),
            Arc::new(FakeMedia { fail: fail_uploads }),
            PasswordService::new(test_password_config()),
        )
    }

    async fn stage_file(label: &str) -> StagedAsset {
        let path: PathBuf =
            std::env::temp_dir().join(format!("{}-{}.png", label, uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"png").await.unwrap();
        StagedAsset::new(path)
    }

    fn request(username: &str, email: &str, avatar: Option<StagedAsset>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Ana".to_string(),
            password: PASSWORD.to_string(),
            avatar,
            cover_image: None,
        }
    }

    #[tokio::test]
    async fn test_register_returns_sanitized_account() {
        let store = MemoryStore::new();
        let service = service(store.clone(), false);
        let avatar = stage_file("avatar").await;
        let avatar_path = avatar.path.clone();

        let view = service.register(request("Ana", "Ana@X.com", Some(avatar))).await.unwrap();

        // Normalized identity, no credential material in the projection
        assert_eq!(view.username, "ana");
        assert_eq!(view.email, "ana@x.com");
        assert!(view.avatar_url.starts_with("https://cdn.example.com/"));
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());

        // Stored hash is never the plaintext
        let stored = store.get(view.id).await.unwrap();
        assert_ne!(stored.password_hash, PASSWORD);
        assert!(stored.password_hash.starts_with("$argon2id$"));

        // Staged file was consumed by the upload
        assert!(!avatar_path.exists());
    }

    #[tokio::test]
    async fn test_register_with_cover_image() {
        let store = MemoryStore::new();
        let service = service(store, false);

        let mut req = request("ana", "ana@x.com", Some(stage_file("avatar").await));
        req.cover_image = Some(stage_file("cover").await);

        let view = service.register(req).await.unwrap();
        assert!(view.cover_image_url.is_some());
    }

    #[tokio::test]
    async fn test_missing_fields_collects_violations() {
        let service = service(MemoryStore::new(), false);

        let mut req = request("", "", None);
        req.full_name = String::new();
        req.password = String::new();

        match service.register(req).await.unwrap_err() {
            AuthError::Validation(violations) => assert_eq!(violations.len(), 4),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_email_must_contain_at() {
        let service = service(MemoryStore::new(), false);
        let result = service.register(request("ana", "not-an-email", None)).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let service = service(MemoryStore::new(), false);
        let mut req = request("ana", "ana@x.com", None);
        req.password = "weakpass".to_string();
        let result = service.register(req).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_avatar_is_required() {
        let service = service(MemoryStore::new(), false);
        let result = service.register(request("ana", "ana@x.com", None)).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_and_releases_assets() {
        let store = MemoryStore::new();
        let service = service(store, false);

        let first = stage_file("avatar").await;
        service.register(request("ana", "ana@x.com", Some(first))).await.unwrap();

        // Same email, different username
        let second = stage_file("avatar").await;
        let second_path = second.path.clone();
        let result = service.register(request("other", "ana@x.com", Some(second))).await;

        assert!(matches!(result, Err(AuthError::Conflict(_))));
        // The staged avatar never reached an upload and must still be swept
        assert!(!second_path.exists());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let service = service(store, false);

        service
            .register(request("ana", "ana@x.com", Some(stage_file("avatar").await)))
            .await
            .unwrap();

        let result = service
            .register(request("ana", "elsewhere@x.com", Some(stage_file("avatar").await)))
            .await;

        assert!(matches!(result, Err(AuthError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_failed_avatar_upload_is_an_upload_error() {
        let service = service(MemoryStore::new(), true);
        let avatar = stage_file("avatar").await;
        let avatar_path = avatar.path.clone();

        let result = service.register(request("ana", "ana@x.com", Some(avatar))).await;

        assert!(matches!(result, Err(AuthError::Upload(_))));
        // Deleted by the upload implementation despite the failure
        assert!(!avatar_path.exists());
    }
}
