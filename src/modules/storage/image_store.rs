//! Image storage contract used by the category service
//!
//! Images are addressed by a generated asset name (`<uuid>.<ext>`); the
//! backing store decides where the bytes live.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::modules::storage::MinIOClient;

/// Allowed MIME types for category images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Binary image payload received with a create or update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl ImageUpload {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub fn is_image_type_allowed(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// Get file extension from an image content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Generate a fresh asset name for an upload
pub fn generate_image_name(content_type: &str) -> Result<String> {
    let extension = get_extension_from_content_type(content_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Image type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_IMAGE_TYPES.join(", ")
        ))
    })?;

    Ok(format!("{}.{}", Uuid::new_v4(), extension))
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the payload and return the asset name it was stored under
    async fn save_image(&self, upload: ImageUpload) -> Result<String>;

    /// Remove the named asset; a missing asset is not an error
    async fn delete_image_if_exists(&self, name: &str) -> Result<()>;

    /// Public URL for an asset name
    fn image_url(&self, name: &str) -> String;
}

/// Image store keeping category images under the public prefix of a MinIO bucket
pub struct MinioImageStore {
    client: Arc<MinIOClient>,
    images_path: String,
}

impl MinioImageStore {
    pub fn new(client: Arc<MinIOClient>, images_path: impl Into<String>) -> Self {
        Self {
            client,
            images_path: images_path.into(),
        }
    }

    fn object_key(&self, name: &str) -> String {
        object_key(self.client.public_prefix(), &self.images_path, name)
    }
}

fn object_key(public_prefix: &str, images_path: &str, name: &str) -> String {
    format!("{}/{}/{}", public_prefix, images_path, name)
}

#[async_trait]
impl ImageStore for MinioImageStore {
    async fn save_image(&self, upload: ImageUpload) -> Result<String> {
        let name = generate_image_name(&upload.content_type)?;
        let key = self.object_key(&name);

        self.client
            .upload(&key, upload.data, &upload.content_type)
            .await?;

        debug!(
            "Stored category image '{}' (original filename '{}')",
            key, upload.file_name
        );
        Ok(name)
    }

    async fn delete_image_if_exists(&self, name: &str) -> Result<()> {
        let key = self.object_key(name);

        if self.client.exists(&key).await? {
            self.client.delete(&key).await?;
        } else {
            debug!("Category image '{}' already absent", key);
        }

        Ok(())
    }

    fn image_url(&self, name: &str) -> String {
        self.client.get_public_url(&self.object_key(name))
    }
}
