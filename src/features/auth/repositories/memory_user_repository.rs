use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::user_repository::{UserRepository, EMAIL_TAKEN};
use crate::core::error::{AppError, Result};
use crate::features::auth::models::User;

/// User store kept in a map, keyed by id
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create("a@example.com", "hash").await.unwrap();

        assert!(matches!(
            repo.create("a@example.com", "other").await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(
            repo.find_by_email("a@example.com").await.unwrap().unwrap().id,
            user.id
        );
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
