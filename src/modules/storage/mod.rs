//! Storage module for category images
//!
//! Provides the `ImageStore` contract and its MinIO/S3-backed implementation.

mod image_store;
mod minio_client;

pub use image_store::{
    is_image_type_allowed, ImageStore, ImageUpload, MinioImageStore, ALLOWED_IMAGE_TYPES,
};
pub use minio_client::MinIOClient;
