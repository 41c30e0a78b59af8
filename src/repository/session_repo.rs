//! Session repository (会话数据访问)

use crate::{error::AppError, models::session::Session};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// One session record per user; writes are last-writer-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert, or overwrite both tokens of the existing row.
    async fn upsert(
        &self,
        user_id: Uuid,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), AppError>;

    /// A session whose user no longer exists is reported as absent.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Session>, AppError>;

    /// Deleting a missing row is not an error.
    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), AppError>;
}

pub struct SessionRepository {
    db: PgPool,
}

impl SessionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    /// 写入或覆盖会话
    async fn upsert(
        &self,
        user_id: Uuid,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (user_id, access_token, refresh_token, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(access_token)
        .bind(refresh_token)
        .execute(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::UserNotFound
            }
            other => AppError::Database(other),
        })?;

        Ok(())
    }

    /// 根据用户 ID 查找会话
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT s.user_id, s.access_token, s.refresh_token, s.updated_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    /// 删除会话
    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
