use chrono::{DateTime, Utc};
use services::auth::{UserId, UserRecord};
use uuid::Uuid;

/// Row of the `users` table
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Provider that last authenticated this user (google, ...)
    pub identity_provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<tokio_postgres::Row> for User {
    fn from(row: tokio_postgres::Row) -> Self {
        Self {
            id: row.get("id"),
            email: row.get("email"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            identity_provider: row.get("identity_provider"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            user_id: UserId(user.id),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            identity_provider: user.identity_provider,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
