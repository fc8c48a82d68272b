use crate::db::DbResult;
use crate::db::error::DbError;
use crate::db::repo::UserRepo;
use crate::models::types::UserId;
use crate::models::user::{NewUser, User, UserKind};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Ephemeral user store. Enforces the same creator-username constraint the
/// database schema does, so the register flow behaves identically in tests.
#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<UserId, User>,
    // creator username -> user id; entry() makes the claim atomic
    creators: DashMap<String, UserId>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn is_username_unique(&self, username: &str) -> DbResult<bool> {
        Ok(!self.creators.contains_key(username))
    }

    async fn count_users_with_code(&self, code: &str) -> DbResult<i64> {
        let n = self
            .users
            .iter()
            .filter(|u| u.code.as_deref() == Some(code))
            .count();
        Ok(n as i64)
    }

    async fn insert_user(&self, user: NewUser) -> DbResult<User> {
        if user.kind == UserKind::Creator {
            match self.creators.entry(user.username.clone()) {
                Entry::Occupied(_) => return Err(DbError::UniqueViolation),
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                }
            }
        }

        let record = User {
            id: user.id,
            username: user.username,
            password_hash: user.password_hash,
            kind: user.kind,
            code: user.code,
            created_at: chrono::Utc::now(),
        };
        self.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        // Oldest record first, matching the database ordering
        let found = self
            .users
            .iter()
            .filter(|u| u.username == username)
            .min_by_key(|u| u.created_at)
            .map(|u| u.value().clone());
        Ok(found)
    }

    async fn get_player_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let found = self
            .users
            .iter()
            .filter(|u| u.kind == UserKind::Player && u.username == username)
            .min_by_key(|u| u.created_at)
            .map(|u| u.value().clone());
        Ok(found)
    }
}
