use crate::db::DbResult;
use crate::db::error::DbError;
use crate::models::types::{GameId, QuizId, UserId};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// A quiz embedded in its parent game. Questions are opaque documents as far
/// as this layer is concerned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    pub questions: Vec<serde_json::Value>,
}

/// Partial update for a single quiz; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizUpdate {
    pub title: Option<String>,
    pub questions: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub struct Game {
    /// Unique game ID
    pub id: GameId,
    /// Join code shared with players (unique per game)
    pub code: String,
    /// Owning creator's user id
    pub creator_id: UserId,
    /// Player user ids, in join order
    pub players: Vec<UserId>,
    /// Upper bound on the player list length
    pub max_player_limit: i32,
    /// Quizzes owned by this game
    pub quizes: Vec<Quiz>,
    /// Record creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Game {
    pub fn try_from_row(row: &Row) -> DbResult<Self> {
        let quizes: serde_json::Value = row.try_get("quizes")?;
        let quizes: Vec<Quiz> = serde_json::from_value(quizes)
            .map_err(|e| DbError::Decode(format!("quizes column: {e}")))?;

        Ok(Self {
            id: row.try_get::<_, GameId>("id")?,
            code: row.try_get("code")?,
            creator_id: row.try_get::<_, UserId>("creator_id")?,
            players: row.try_get::<_, Vec<UserId>>("players")?,
            max_player_limit: row.try_get("max_player_limit")?,
            quizes,
            created_at: row.try_get("created_at")?,
        })
    }

    /// True iff the player list has grown past the configured bound.
    pub fn is_over_limit(&self) -> bool {
        self.players.len() as i32 > self.max_player_limit
    }
}

/// Insert shape for a new game. Starts with no players and no quizzes.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub id: GameId,
    pub code: String,
    pub creator_id: UserId,
    pub max_player_limit: i32,
}

impl NewGame {
    pub fn new(code: impl Into<String>, creator_id: UserId, max_player_limit: i32) -> Self {
        Self {
            id: GameId::new(),
            code: code.into(),
            creator_id,
            max_player_limit,
        }
    }
}

/// Partial update of a game's own fields; player and quiz mutation goes
/// through the dedicated repo operations instead.
#[derive(Debug, Clone, Default)]
pub struct GameUpdate {
    pub code: Option<String>,
    pub max_player_limit: Option<i32>,
}
