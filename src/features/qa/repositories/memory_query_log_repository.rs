use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::query_log_repository::QueryLogRepository;
use crate::core::error::Result;
use crate::features::qa::models::{NewQueryLog, QueryLog};

/// Query records kept in memory alongside their owner
#[derive(Default)]
pub struct InMemoryQueryLogRepository {
    records: RwLock<Vec<(Uuid, QueryLog)>>,
}

impl InMemoryQueryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryLogRepository for InMemoryQueryLogRepository {
    async fn insert(&self, log: NewQueryLog) -> Result<QueryLog> {
        let record = QueryLog {
            id: Uuid::now_v7(),
            question: log.question,
            response: log.response,
            response_time: log.response_time,
            source_documents: log.source_documents,
            timestamp: Utc::now(),
        };
        self.records
            .write()
            .await
            .push((log.user_id, record.clone()));
        Ok(record)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<QueryLog>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_log(user_id: Uuid, question: &str) -> NewQueryLog {
        NewQueryLog {
            user_id,
            question: question.to_string(),
            response: "answer".to_string(),
            response_time: 0.1,
            source_documents: None,
        }
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let repo = InMemoryQueryLogRepository::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        repo.insert(new_log(alice, "first")).await.unwrap();
        repo.insert(new_log(bob, "other")).await.unwrap();
        repo.insert(new_log(alice, "second")).await.unwrap();

        let questions: Vec<String> = repo
            .list_by_user(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.question)
            .collect();
        assert_eq!(questions, vec!["second", "first"]);
        assert_eq!(repo.list_by_user(bob).await.unwrap().len(), 1);
    }
}
