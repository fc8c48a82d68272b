use crate::db::repo::GameRepo;
use crate::db::{Db, DbResult, map_pg_err, map_row_opt};
use crate::models::game::{Game, GameUpdate, NewGame, Quiz, QuizUpdate};
use crate::models::types::{GameId, QuizId, UserId};
use std::sync::Arc;

pub struct GameRepository {
    db: Arc<Db>,
}

impl GameRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl GameRepo for GameRepository {
    async fn insert_game(&self, game: NewGame) -> DbResult<Game> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                r#"
                INSERT INTO games (id, code, creator_id, max_player_limit)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .await?;

        let row = client
            .query_one(&stmt, &[&game.id, &game.code, &game.creator_id, &game.max_player_limit])
            .await
            .map_err(map_pg_err)?;

        Game::try_from_row(&row)
    }

    async fn get_by_id(&self, id: GameId) -> DbResult<Option<Game>> {
        let client = self.db.get_client().await?;

        let stmt = client.prepare_cached("SELECT * FROM games WHERE id = $1").await?;

        let row_opt = client.query_opt(&stmt, &[&id]).await?;
        map_row_opt(row_opt, Game::try_from_row, &format!("GameRepo::get_by_id id={}", id))
    }

    async fn get_by_code(&self, code: &str) -> DbResult<Option<Game>> {
        let client = self.db.get_client().await?;

        let stmt = client.prepare_cached("SELECT * FROM games WHERE code = $1").await?;

        let row_opt = client.query_opt(&stmt, &[&code]).await?;
        map_row_opt(
            row_opt,
            Game::try_from_row,
            &format!("GameRepo::get_by_code code={}", code),
        )
    }

    async fn get_by_creator(&self, creator_id: UserId) -> DbResult<Vec<Game>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached("SELECT * FROM games WHERE creator_id = $1 ORDER BY created_at")
            .await?;

        let rows = client.query(&stmt, &[&creator_id]).await?;
        rows.iter().map(Game::try_from_row).collect()
    }

    async fn update_game(&self, id: GameId, update: &GameUpdate) -> DbResult<Option<Game>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                r#"
                UPDATE games
                SET code = COALESCE($2, code),
                    max_player_limit = COALESCE($3, max_player_limit)
                WHERE id = $1
                RETURNING *
                "#,
            )
            .await?;

        let row_opt = client
            .query_opt(&stmt, &[&id, &update.code, &update.max_player_limit])
            .await
            .map_err(map_pg_err)?;
        map_row_opt(row_opt, Game::try_from_row, &format!("GameRepo::update_game id={}", id))
    }

    async fn add_player(&self, code: &str, player_id: UserId) -> DbResult<Option<Game>> {
        let client = self.db.get_client().await?;

        // Single-statement append; concurrent joins serialize on the row
        // instead of racing a read-modify-write cycle.
        let stmt = client
            .prepare_cached(
                r#"
                UPDATE games
                SET players = array_append(players, $2)
                WHERE code = $1
                RETURNING *
                "#,
            )
            .await?;

        let row_opt = client.query_opt(&stmt, &[&code, &player_id]).await?;
        map_row_opt(
            row_opt,
            Game::try_from_row,
            &format!("GameRepo::add_player code={}", code),
        )
    }

    async fn add_quiz(&self, id: GameId, quiz: &Quiz) -> DbResult<Option<Game>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                r#"
                UPDATE games
                SET quizes = quizes || $2::jsonb
                WHERE id = $1
                RETURNING *
                "#,
            )
            .await?;

        let quiz_doc = serde_json::json!([quiz]);
        let row_opt = client.query_opt(&stmt, &[&id, &quiz_doc]).await?;
        map_row_opt(row_opt, Game::try_from_row, &format!("GameRepo::add_quiz id={}", id))
    }

    async fn update_quiz(&self, id: GameId, quiz_id: QuizId, update: &QuizUpdate) -> DbResult<Option<Game>> {
        let client = self.db.get_client().await?;

        // Merge the patch object into the matching array element; the id key
        // is reasserted so a patch can never detach the quiz from its id.
        let stmt = client
            .prepare_cached(
                r#"
                UPDATE games
                SET quizes = COALESCE(
                    (
                        SELECT jsonb_agg(CASE WHEN q->>'id' = $2 THEN q || $3::jsonb ELSE q END ORDER BY ord)
                        FROM jsonb_array_elements(quizes) WITH ORDINALITY AS t(q, ord)
                    ),
                    '[]'::jsonb
                )
                WHERE id = $1
                RETURNING *
                "#,
            )
            .await?;

        let mut patch = serde_json::Map::new();
        patch.insert("id".into(), serde_json::json!(quiz_id));
        if let Some(title) = &update.title {
            patch.insert("title".into(), serde_json::json!(title));
        }
        if let Some(questions) = &update.questions {
            patch.insert("questions".into(), serde_json::json!(questions));
        }
        let patch = serde_json::Value::Object(patch);

        let row_opt = client
            .query_opt(&stmt, &[&id, &quiz_id.to_string(), &patch])
            .await?;
        map_row_opt(
            row_opt,
            Game::try_from_row,
            &format!("GameRepo::update_quiz id={} quiz_id={}", id, quiz_id),
        )
    }

    async fn remove_quiz(&self, id: GameId, quiz_id: QuizId) -> DbResult<Option<Game>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                r#"
                UPDATE games
                SET quizes = COALESCE(
                    (
                        SELECT jsonb_agg(q ORDER BY ord)
                        FROM jsonb_array_elements(quizes) WITH ORDINALITY AS t(q, ord)
                        WHERE q->>'id' <> $2
                    ),
                    '[]'::jsonb
                )
                WHERE id = $1
                RETURNING *
                "#,
            )
            .await?;

        let row_opt = client.query_opt(&stmt, &[&id, &quiz_id.to_string()]).await?;
        map_row_opt(
            row_opt,
            Game::try_from_row,
            &format!("GameRepo::remove_quiz id={} quiz_id={}", id, quiz_id),
        )
    }

    async fn delete_game(&self, id: GameId) -> DbResult<Option<Game>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached("DELETE FROM games WHERE id = $1 RETURNING *")
            .await?;

        let row_opt = client.query_opt(&stmt, &[&id]).await?;
        map_row_opt(
            row_opt,
            Game::try_from_row,
            &format!("GameRepo::delete_game id={}", id),
        )
    }
}
