use crate::db::DbResult;
use crate::models::game::{Game, GameUpdate, NewGame, Quiz, QuizUpdate};
use crate::models::types::{GameId, QuizId, UserId};

#[async_trait::async_trait]
pub trait GameRepo: Send + Sync {
    /// Inserts a new game record. Surfaces DbError::UniqueViolation when the
    /// code is already taken.
    async fn insert_game(&self, game: NewGame) -> DbResult<Game>;

    /// Looks up a game by id.
    async fn get_by_id(&self, id: GameId) -> DbResult<Option<Game>>;

    /// Looks up a game by join code.
    async fn get_by_code(&self, code: &str) -> DbResult<Option<Game>>;

    /// All games owned by a creator.
    async fn get_by_creator(&self, creator_id: UserId) -> DbResult<Vec<Game>>;

    /// Applies a partial update to a game's own fields.
    async fn update_game(&self, id: GameId, update: &GameUpdate) -> DbResult<Option<Game>>;

    /// Appends a player id to the game's player list in a single storage
    /// update, never read-modify-write. Concurrent joins must not lose
    /// appends.
    async fn add_player(&self, code: &str, player_id: UserId) -> DbResult<Option<Game>>;

    /// Appends a quiz to the game's quiz list.
    async fn add_quiz(&self, id: GameId, quiz: &Quiz) -> DbResult<Option<Game>>;

    /// Patches one embedded quiz; absent fields keep their stored value.
    async fn update_quiz(&self, id: GameId, quiz_id: QuizId, update: &QuizUpdate) -> DbResult<Option<Game>>;

    /// Removes one embedded quiz.
    async fn remove_quiz(&self, id: GameId, quiz_id: QuizId) -> DbResult<Option<Game>>;

    /// Deletes a game, returning the deleted record.
    async fn delete_game(&self, id: GameId) -> DbResult<Option<Game>>;
}
