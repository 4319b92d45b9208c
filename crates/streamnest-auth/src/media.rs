//! Media upload collaborator contract
//!
//! Avatar and cover images arrive as files already staged on local disk by
//! the upload-staging layer. The registration workflow hands them to a
//! [`MediaStorage`] implementation (object storage, CDN, ...) and only ever
//! sees back a URL. Staged files are temporary: whoever touches one last is
//! responsible for deleting it, success or failure.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AuthResult;

/// A temporary local file produced by the upload-staging layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedAsset {
    pub path: PathBuf,
}

impl StagedAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of a successful media upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedMedia {
    /// Publicly reachable URL of the stored asset
    pub url: String,
    /// Size of the stored asset in bytes, when the backend reports it
    pub bytes: Option<u64>,
}

/// External media storage the registration workflow delegates to.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Upload a staged local asset and return its public URL.
    ///
    /// `Ok(None)` means the upload failed in a way the caller decides how to
    /// treat (required avatar vs. optional cover image). Implementations must
    /// delete the staged local file on success AND on failure so abandoned
    /// uploads never accumulate on disk.
    async fn upload(&self, asset: &StagedAsset) -> AuthResult<Option<UploadedMedia>>;
}

/// Delete a staged file that never made it to an upload.
///
/// Removal failures are logged, never propagated: cleanup must not mask the
/// error that put us on this path, and a file already gone is not a problem.
pub async fn release_staged(asset: &StagedAsset) {
    match tokio::fs::remove_file(&asset.path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %asset.path.display(), error = %e, "Failed to release staged asset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_release_staged_removes_file() {
        let path = std::env::temp_dir().join(format!("staged-{}.png", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"fake image bytes").await.unwrap();

        let asset = StagedAsset::new(&path);
        release_staged(&asset).await;

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_staged_tolerates_missing_file() {
        let asset = StagedAsset::new("/nonexistent/staged-asset.png");
        // Must not panic or error
        release_staged(&asset).await;
    }
}
