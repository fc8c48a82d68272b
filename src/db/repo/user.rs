use crate::db::DbResult;
use crate::models::user::{NewUser, User};

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// True if no creator account holds this username. Player identities do
    /// not count against it.
    async fn is_username_unique(&self, username: &str) -> DbResult<bool>;

    /// Number of users registered under a game code.
    async fn count_users_with_code(&self, code: &str) -> DbResult<i64>;

    /// Inserts a new user record. Surfaces DbError::UniqueViolation when a
    /// concurrent insert won the creator-username race.
    async fn insert_user(&self, user: NewUser) -> DbResult<User>;

    /// Looks up a user by username.
    async fn get_by_username(&self, username: &str) -> DbResult<Option<User>>;

    /// Looks up a player identity by username, ignoring any creator account
    /// holding the same name.
    async fn get_player_by_username(&self, username: &str) -> DbResult<Option<User>>;
}
