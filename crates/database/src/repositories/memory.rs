use anyhow::Result;
use async_trait::async_trait;
use services::auth::{UserId, UserRecord, UserRepository};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Users {
    by_id: HashMap<UserId, UserRecord>,
    id_by_email: HashMap<String, UserId>,
}

/// Process-local user store, used when no database is configured and in tests.
///
/// An upsert holds the write lock from lookup to insert, so two sign-ins
/// racing on one email cannot both create a row.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Users>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.by_id.get(&user_id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .id_by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn upsert(&self, candidate: UserRecord) -> Result<UserRecord> {
        let mut users = self.users.write().await;

        if let Some(id) = users.id_by_email.get(&candidate.email).copied() {
            if let Some(existing) = users.by_id.get_mut(&id) {
                existing.first_name = candidate.first_name;
                existing.last_name = candidate.last_name;
                existing.identity_provider = candidate.identity_provider;
                existing.updated_at = candidate.updated_at;
                debug!("Updated in-memory user {} ({})", existing.email, existing.user_id);
                return Ok(existing.clone());
            }
        }

        users
            .id_by_email
            .insert(candidate.email.clone(), candidate.user_id);
        users.by_id.insert(candidate.user_id, candidate.clone());
        debug!("Inserted in-memory user {} ({})", candidate.email, candidate.user_id);
        Ok(candidate)
    }
}
