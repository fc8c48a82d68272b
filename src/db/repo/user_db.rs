use crate::db::repo::UserRepo;
use crate::db::{Db, DbResult, map_pg_err, map_row_opt};
use crate::models::user::{NewUser, User};
use std::sync::Arc;

pub struct UserRepository {
    db: Arc<Db>,
}

impl UserRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl UserRepo for UserRepository {
    async fn is_username_unique(&self, username: &str) -> DbResult<bool> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached("SELECT NOT EXISTS (SELECT 1 FROM users WHERE username = $1 AND kind = 'creator')")
            .await?;

        let row = client.query_one(&stmt, &[&username]).await?;
        Ok(row.try_get::<_, bool>(0)?)
    }

    async fn count_users_with_code(&self, code: &str) -> DbResult<i64> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached("SELECT COUNT(*) FROM users WHERE code = $1")
            .await?;

        let row = client.query_one(&stmt, &[&code]).await?;
        Ok(row.try_get::<_, i64>(0)?)
    }

    async fn insert_user(&self, user: NewUser) -> DbResult<User> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                r#"
                INSERT INTO users (id, username, password_hash, kind, code)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .await?;

        let row = client
            .query_one(
                &stmt,
                &[&user.id, &user.username, &user.password_hash, &user.kind, &user.code],
            )
            .await
            .map_err(map_pg_err)?;

        User::try_from_row(&row)
    }

    async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached("SELECT * FROM users WHERE username = $1 ORDER BY created_at LIMIT 1")
            .await?;

        let row_opt = client.query_opt(&stmt, &[&username]).await?;
        map_row_opt(
            row_opt,
            User::try_from_row,
            &format!("UserRepo::get_by_username username={}", username),
        )
    }

    async fn get_player_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                "SELECT * FROM users WHERE username = $1 AND kind = 'player' ORDER BY created_at LIMIT 1",
            )
            .await?;

        let row_opt = client.query_opt(&stmt, &[&username]).await?;
        map_row_opt(
            row_opt,
            User::try_from_row,
            &format!("UserRepo::get_player_by_username username={}", username),
        )
    }
}
