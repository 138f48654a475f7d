//! MinIO/S3-compatible storage client
//!
//! Stores raw uploaded document files. Uses the rust-s3 crate for
//! lightweight S3 operations with path-style addressing.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::ObjectStorage;
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    prefix: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            prefix: config.prefix.trim_matches('/').to_string(),
        };

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.prefix
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        match Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    // Bucket might exist with a different error (e.g. restricted credentials)
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

#[async_trait]
impl ObjectStorage for MinIOClient {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        if !(200..300).contains(&response.status_code()) {
            return Err(AppError::Storage(format!(
                "Failed to upload file '{}': status {}",
                key,
                response.status_code()
            )));
        }

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to download file '{}': {}", key, e)))?;

        match response.status_code() {
            200..=299 => {
                debug!("Downloaded file '{}' from bucket '{}'", key, self.bucket.name());
                Ok(response.to_vec())
            }
            404 => Err(AppError::NotFound(format!("Object '{}' not found", key))),
            status => Err(AppError::Storage(format!(
                "Failed to download file '{}': status {}",
                key, status
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file '{}': {}", key, e)))?;

        match response.status_code() {
            200..=299 | 404 => {
                debug!("Deleted file '{}' from bucket '{}'", key, self.bucket.name());
                Ok(())
            }
            status => Err(AppError::Storage(format!(
                "Failed to delete file '{}': status {}",
                key, status
            ))),
        }
    }

    fn document_key(&self, user_id: &str, document_id: &str, extension: &str) -> String {
        if self.prefix.is_empty() {
            format!("{}/{}.{}", user_id, document_id, extension)
        } else {
            format!("{}/{}/{}.{}", self.prefix, user_id, document_id, extension)
        }
    }

    fn name(&self) -> &str {
        "minio"
    }
}
