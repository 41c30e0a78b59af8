//! Session record: the current token pair of a user

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// At most one row exists per `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}
