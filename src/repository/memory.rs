//! In-memory user directory and session store for development and tests

use super::{SessionStore, UserDirectory};
use crate::{
    error::AppError,
    models::{session::Session, user::User},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Both relations behind one store so that deleting a user cascades to the
/// session. Locks are always taken users-then-sessions.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == username) {
            return Err(AppError::UsernameTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let mut users = self.users.write().await;

        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        let removed = users.remove(&id).is_some();
        self.sessions.write().await.remove(&id);

        Ok(removed)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        let users = self.users.read().await;
        if !users.contains_key(&user_id) {
            // same outcome as the foreign key on `sessions.user_id`
            return Err(AppError::UserNotFound);
        }

        self.sessions.write().await.insert(
            user_id,
            Session {
                user_id,
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
                updated_at: Utc::now(),
            },
        );

        Ok(())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Session>, AppError> {
        let users = self.users.read().await;
        if !users.contains_key(&user_id) {
            return Ok(None);
        }

        Ok(self.sessions.read().await.get(&user_id).cloned())
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), AppError> {
        self.sessions.write().await.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_rejects_duplicate_username() {
        let store = MemoryStore::new();
        let first = store.create("alice", "h1").await.unwrap();

        let result = store.create("alice", "h2").await;
        assert!(matches!(result, Err(AppError::UsernameTaken)));

        let existing = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(existing.id, first.id);
        assert_eq!(existing.password_hash, "h1");
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let store = MemoryStore::new();
        let user = store.create("alice", "h").await.unwrap();

        store.upsert(user.id, "a1", "r1").await.unwrap();
        store.upsert(user.id, "a2", "r2").await.unwrap();

        let session = store.find_by_user_id(user.id).await.unwrap().unwrap();
        assert_eq!(session.access_token, "a2");
        assert_eq!(session.refresh_token, "r2");
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let user = store.create("alice", "h").await.unwrap();
        store.upsert(user.id, "a", "r").await.unwrap();

        store.delete_by_user_id(user.id).await.unwrap();
        store.delete_by_user_id(user.id).await.unwrap();
        assert!(store.find_by_user_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_user_drops_session() {
        let store = MemoryStore::new();
        let user = store.create("alice", "h").await.unwrap();
        store.upsert(user.id, "a", "r").await.unwrap();

        assert!(UserDirectory::delete(&store, user.id).await.unwrap());
        assert!(store.find_by_user_id(user.id).await.unwrap().is_none());
        assert_eq!(store.session_count().await, 0);
    }
}
