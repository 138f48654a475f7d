use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document_repository::{DocumentRepository, DocumentStats};
use crate::core::error::Result;
use crate::features::documents::models::{Document, DocumentStatus, NewDocument};

/// In-process document store; keeps insertion order for stable listings
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update<F: FnOnce(&mut Document)>(&self, id: Uuid, f: F) -> bool {
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                f(doc);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, doc: NewDocument) -> Result<Document> {
        let document = Document {
            id: doc.id,
            user_id: doc.user_id,
            filename: doc.filename,
            file_type: doc.file_type.as_str().to_string(),
            file_size: doc.file_size,
            storage_key: doc.storage_key,
            content: doc.content,
            status: DocumentStatus::Pending.as_str().to_string(),
            chunk_count: 0,
            error_message: None,
            uploaded_at: Utc::now(),
        };
        self.documents.write().await.push(document.clone());
        Ok(document)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .rev()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|d| d.id == id && d.user_id == user_id)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|d| d.id == id).cloned())
    }

    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| !(d.id == id && d.user_id == user_id));
        Ok(documents.len() < before)
    }

    async fn mark_indexed(&self, id: Uuid, chunk_count: i32) -> Result<bool> {
        Ok(self
            .update(id, |doc| {
                doc.status = DocumentStatus::Indexed.as_str().to_string();
                doc.chunk_count = chunk_count;
                doc.error_message = None;
            })
            .await)
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<bool> {
        Ok(self
            .update(id, |doc| {
                doc.status = DocumentStatus::Failed.as_str().to_string();
                doc.chunk_count = 0;
                doc.error_message = Some(error_message.to_string());
            })
            .await)
    }

    async fn list_pending_ids(&self) -> Result<Vec<Uuid>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Pending.as_str())
            .map(|d| d.id)
            .collect())
    }

    async fn stats_for_user(&self, user_id: Uuid) -> Result<DocumentStats> {
        let documents = self.documents.read().await;
        let owned = documents.iter().filter(|d| d.user_id == user_id);
        let mut stats = DocumentStats::default();
        for doc in owned {
            stats.total += 1;
            if doc.status == DocumentStatus::Indexed.as_str() {
                stats.indexed += 1;
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::documents::models::FileType;

    fn new_doc(user_id: Uuid, filename: &str) -> NewDocument {
        NewDocument {
            id: Uuid::now_v7(),
            user_id,
            filename: filename.to_string(),
            file_type: FileType::Txt,
            file_size: 42,
            storage_key: format!("documents/{}/{}.txt", user_id, filename),
            content: "some extracted text".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_scoped() {
        let repo = InMemoryDocumentRepository::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        repo.insert(new_doc(alice, "first.txt")).await.unwrap();
        repo.insert(new_doc(bob, "other.txt")).await.unwrap();
        repo.insert(new_doc(alice, "second.txt")).await.unwrap();

        let names: Vec<String> = repo
            .list_by_user(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.filename)
            .collect();
        assert_eq!(names, vec!["second.txt", "first.txt"]);
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let repo = InMemoryDocumentRepository::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let doc = repo.insert(new_doc(alice, "a.txt")).await.unwrap();

        assert!(!repo.delete_for_user(doc.id, bob).await.unwrap());
        assert!(repo.find_for_user(doc.id, bob).await.unwrap().is_none());
        assert!(repo.delete_for_user(doc.id, alice).await.unwrap());
        assert!(repo.find_by_id(doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_transitions_and_stats() {
        let repo = InMemoryDocumentRepository::new();
        let user = Uuid::new_v4();
        let a = repo.insert(new_doc(user, "a.txt")).await.unwrap();
        let b = repo.insert(new_doc(user, "b.txt")).await.unwrap();

        assert_eq!(repo.list_pending_ids().await.unwrap(), vec![a.id, b.id]);

        assert!(repo.mark_indexed(a.id, 3).await.unwrap());
        assert!(repo.mark_failed(b.id, "boom").await.unwrap());
        assert!(!repo.mark_indexed(Uuid::new_v4(), 1).await.unwrap());

        let b = repo.find_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(b.status, "failed");
        assert_eq!(b.error_message.as_deref(), Some("boom"));
        assert!(repo.list_pending_ids().await.unwrap().is_empty());
        assert_eq!(
            repo.stats_for_user(user).await.unwrap(),
            DocumentStats {
                total: 2,
                indexed: 1
            }
        );
    }
}
