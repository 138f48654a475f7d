use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::ObjectStorage;
use crate::core::error::AppError;

/// Keeps uploaded files in process memory.
///
/// Used when `MINIO_ENABLED=false` and in tests. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Object '{}' not found", key)))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    fn document_key(&self, user_id: &str, document_id: &str, extension: &str) -> String {
        format!("documents/{}/{}.{}", user_id, document_id, extension)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
