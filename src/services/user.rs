use crate::db::repo::UserRepo;
use crate::error::AppResult;
use crate::models::user::{NewUser, User};
use std::sync::Arc;

/// Thin persistence surface over user records. No business logic beyond the
/// query shape; the controller owns the branching.
pub struct UserService {
    repo: Arc<dyn UserRepo>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepo>) -> Self {
        Self { repo }
    }

    /// Creator-scoped uniqueness check.
    pub async fn is_username_unique(&self, username: &str) -> AppResult<bool> {
        Ok(self.repo.is_username_unique(username).await?)
    }

    pub async fn get_number_of_users_with_code(&self, code: &str) -> AppResult<i64> {
        Ok(self.repo.count_users_with_code(code).await?)
    }

    pub async fn create_user(&self, user: NewUser) -> AppResult<User> {
        Ok(self.repo.insert_user(user).await?)
    }

    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.repo.get_by_username(username).await?)
    }

    /// Player-scoped lookup for the rejoin path; a creator holding the same
    /// username must not shadow the player identity.
    pub async fn get_player_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.repo.get_player_by_username(username).await?)
    }
}
