//! Image storage boundary.
//!
//! Uploaded images are handed to a [`MediaStore`], which returns the stable
//! reference persisted as `users.profile_pic` or `posts.image`. Resizing and
//! re-encoding belong to the media pipeline behind the store, not to this service.

use crate::error::{ServiceError, ServiceResult};
use base64::{engine::general_purpose, Engine as _};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

/// Largest accepted upload (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    ProfilePic,
    PostImage,
}

impl MediaKind {
    fn dir(&self) -> &'static str {
        match self {
            MediaKind::ProfilePic => "profiles",
            MediaKind::PostImage => "posts",
        }
    }
}

#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist an image and return the reference to store alongside the row.
    async fn store(&self, kind: MediaKind, bytes: Vec<u8>) -> ServiceResult<String>;
}

/// Writes images under a local root directory and serves them from `base_url`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, kind: MediaKind, bytes: Vec<u8>) -> ServiceResult<String> {
        let ext = sniff_image_extension(&bytes)
            .ok_or_else(|| ServiceError::InvalidInput("unsupported image format".to_string()))?;

        let dir = self.root.join(kind.dir());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::Media(format!("create {}: {}", dir.display(), e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ServiceError::Media(format!("write {}: {}", path.display(), e)))?;

        info!(path = %path.display(), size = bytes.len(), "stored image");
        Ok(format!("{}/{}/{}", self.base_url, kind.dir(), file_name))
    }
}

/// Decode a base64 image payload, optionally wrapped as a `data:` URL.
pub fn decode_image(encoded: &str) -> ServiceResult<Vec<u8>> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| ServiceError::InvalidInput("image is not valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(ServiceError::InvalidInput("image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ServiceError::InvalidInput(format!(
            "image exceeds {} bytes",
            MAX_IMAGE_BYTES
        )));
    }
    Ok(bytes)
}

fn sniff_image_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}
