use crate::models::User;
use crate::pool::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use services::auth::{UserId, UserRecord};
use tracing::debug;
use uuid::Uuid;

pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert the candidate, or refresh the names and provider of the row
    /// already holding its email. One statement, so concurrent sign-ins for
    /// the same email converge on a single row.
    pub async fn upsert(&self, candidate: &UserRecord) -> Result<User> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_one(
                r#"
            INSERT INTO users (
                id, email, first_name, last_name, identity_provider,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                identity_provider = EXCLUDED.identity_provider,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
                &[
                    &candidate.user_id.0,
                    &candidate.email,
                    &candidate.first_name,
                    &candidate.last_name,
                    &candidate.identity_provider,
                    &candidate.created_at,
                    &candidate.updated_at,
                ],
            )
            .await
            .context("Failed to upsert user")?;

        let user = User::from(row);
        debug!("Upserted user: {} ({})", user.email, user.id);
        Ok(user)
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt("SELECT * FROM users WHERE id = $1", &[&id])
            .await
            .context("Failed to query user")?;

        Ok(row.map(User::from))
    }

    /// Get a user by email
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt("SELECT * FROM users WHERE email = $1", &[&email])
            .await
            .context("Failed to query user by email")?;

        Ok(row.map(User::from))
    }
}

#[async_trait]
impl services::auth::UserRepository for PgUserRepository {
    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>> {
        Ok(self.get_by_id(user_id.0).await?.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.get_by_email(email).await?.map(Into::into))
    }

    async fn upsert(&self, candidate: UserRecord) -> Result<UserRecord> {
        Ok(self.upsert(&candidate).await?.into())
    }
}
