use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{AuthToken, User};
use sqlx::Row;

use crate::repository::{AuthStore, StorageError, StoredAuth};

use super::SqliteRepository;

#[async_trait]
impl AuthStore for SqliteRepository {
    async fn load_auth(&self) -> Result<Option<StoredAuth>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT token, user_json, saved_at
            FROM auth_session
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let token: String = row
            .try_get("token")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let user_json: String = row
            .try_get("user_json")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let saved_at: DateTime<Utc> = row
            .try_get("saved_at")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let user: User = serde_json::from_str(&user_json)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(StoredAuth {
            token: AuthToken::new(token),
            user,
            saved_at,
        }))
    }

    async fn save_auth(&self, auth: &StoredAuth) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&auth.user)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO auth_session (id, token, user_json, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                user_json = excluded.user_json,
                saved_at = excluded.saved_at
            ",
        )
        .bind(1_i64)
        .bind(auth.token.expose())
        .bind(user_json)
        .bind(auth.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_auth(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM auth_session WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
