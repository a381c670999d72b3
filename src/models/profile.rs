use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teloxide::types::ChatId;
use uuid::Uuid;

use crate::database::{Database, DbError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub chat_id: i64,
    pub email: Option<String>,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub user_type: String,
    pub created_at: DateTime<Utc>,
}

const PROFILE_COLUMNS: &str =
    "id, chat_id, email, full_name, phone, address, user_type, created_at";

impl Profile {
    /// Resolves the current user's identity. Writes require a profile row;
    /// its absence is the not-authenticated condition.
    pub async fn find_by_chat_id(db: &Database, chat_id: ChatId) -> Result<Option<Self>, DbError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE chat_id = $1"
        ))
        .bind(chat_id.0)
        .fetch_optional(&db.pool)
        .await?;

        Ok(profile)
    }

    /// Registers or refreshes the caller's profile on /start.
    pub async fn upsert(db: &Database, chat_id: ChatId, full_name: &str) -> Result<Self, DbError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO profiles (chat_id, full_name)
             VALUES ($1, $2)
             ON CONFLICT (chat_id) DO UPDATE SET
                 full_name = EXCLUDED.full_name,
                 updated_at = NOW()
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(chat_id.0)
        .bind(full_name)
        .fetch_one(&db.pool)
        .await?;

        Ok(profile)
    }
}
