//! Account repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{DbAccount, NewAccount};
use crate::store::CredentialStore;

/// Account repository backed by PostgreSQL.
///
/// Username/email uniqueness is enforced by the `accounts_username_key` and
/// `accounts_email_key` indexes; a violated insert surfaces as
/// [`DbError::Duplicate`] rather than relying on a racy pre-check.
pub struct AccountRepo {
    pool: PgPool,
}

impl AccountRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for AccountRepo {
    async fn create(&self, account: NewAccount) -> DbResult<DbAccount> {
        let row = sqlx::query_as::<_, DbAccount>(
            r#"
            INSERT INTO accounts (username, email, full_name, password_hash, avatar_url, cover_image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, username, email, full_name, password_hash, avatar_url,
                cover_image_url, refresh_token, watch_history, created_at, updated_at
            "#
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.full_name)
        .bind(&account.password_hash)
        .bind(&account.avatar_url)
        .bind(&account.cover_image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("accounts_username_key") {
                    return DbError::Duplicate(format!(
                        "Username {} already exists",
                        account.username
                    ));
                }
                if db_err.constraint() == Some("accounts_email_key") {
                    return DbError::Duplicate(format!("Email {} already exists", account.email));
                }
            }
            DbError::Query(e)
        })?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbAccount>> {
        let account = sqlx::query_as::<_, DbAccount>(
            r#"
            SELECT
                id, username, email, full_name, password_hash, avatar_url,
                cover_image_url, refresh_token, watch_history, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_identifier(&self, identifier: &str) -> DbResult<Option<DbAccount>> {
        let account = sqlx::query_as::<_, DbAccount>(
            r#"
            SELECT
                id, username, email, full_name, password_hash, avatar_url,
                cover_image_url, refresh_token, watch_history, created_at, updated_at
            FROM accounts
            WHERE email = $1 OR username = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<DbAccount>> {
        let account = sqlx::query_as::<_, DbAccount>(
            r#"
            SELECT
                id, username, email, full_name, password_hash, avatar_url,
                cover_image_url, refresh_token, watch_history, created_at, updated_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn update_refresh_token(&self, id: Uuid, token: Option<&str>) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE accounts SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(token)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Account {} not found", id)));
        }

        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> DbResult<bool> {
        // The WHERE clause is the compare half of the compare-and-swap: a
        // concurrent rotation or logout leaves zero rows affected.
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token = $2
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(replacement)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Account {} not found", id)));
        }

        Ok(())
    }

    async fn append_watch_entry(&self, id: Uuid, content_id: Uuid) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET watch_history = array_append(watch_history, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(content_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Account {} not found", id)));
        }

        Ok(())
    }
}
