//! Storage module for uploaded document files
//!
//! Provides the `ObjectStorage` abstraction with a MinIO/S3-compatible
//! implementation and an in-process one for tests and storage-less setups.

mod memory_storage;
mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use memory_storage::InMemoryObjectStorage;
pub use minio_client::MinIOClient;

/// Blob storage for raw uploaded files
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key`, overwriting any existing object
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// Fetch the object stored under `key`
    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError>;

    /// Remove the object stored under `key`. Missing objects are not an error.
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Build the object key for a document file
    fn document_key(&self, user_id: &str, document_id: &str, extension: &str) -> String;

    /// Backend name for logging
    fn name(&self) -> &str;
}
