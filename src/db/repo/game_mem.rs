use crate::db::DbResult;
use crate::db::error::DbError;
use crate::db::repo::GameRepo;
use crate::models::game::{Game, GameUpdate, NewGame, Quiz, QuizUpdate};
use crate::models::types::{GameId, QuizId, UserId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Ephemeral game store. Mutations happen under the entry's shard lock, so
/// concurrent player joins append without losing updates, matching the
/// single-statement semantics of the database implementation.
#[derive(Default)]
pub struct MemoryGameRepo {
    games: DashMap<GameId, Game>,
    // game code -> game id; entry() makes the claim atomic
    codes: DashMap<String, GameId>,
}

impl MemoryGameRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn id_for_code(&self, code: &str) -> Option<GameId> {
        self.codes.get(code).map(|id| *id)
    }
}

#[async_trait::async_trait]
impl GameRepo for MemoryGameRepo {
    async fn insert_game(&self, game: NewGame) -> DbResult<Game> {
        match self.codes.entry(game.code.clone()) {
            Entry::Occupied(_) => return Err(DbError::UniqueViolation),
            Entry::Vacant(slot) => {
                slot.insert(game.id);
            }
        }

        let record = Game {
            id: game.id,
            code: game.code,
            creator_id: game.creator_id,
            players: Vec::new(),
            max_player_limit: game.max_player_limit,
            quizes: Vec::new(),
            created_at: chrono::Utc::now(),
        };
        self.games.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: GameId) -> DbResult<Option<Game>> {
        Ok(self.games.get(&id).map(|g| g.value().clone()))
    }

    async fn get_by_code(&self, code: &str) -> DbResult<Option<Game>> {
        let Some(id) = self.id_for_code(code) else {
            return Ok(None);
        };
        self.get_by_id(id).await
    }

    async fn get_by_creator(&self, creator_id: UserId) -> DbResult<Vec<Game>> {
        let mut games: Vec<Game> = self
            .games
            .iter()
            .filter(|g| g.creator_id == creator_id)
            .map(|g| g.value().clone())
            .collect();
        games.sort_by_key(|g| g.created_at);
        Ok(games)
    }

    async fn update_game(&self, id: GameId, update: &GameUpdate) -> DbResult<Option<Game>> {
        let Some(mut game) = self.games.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(code) = &update.code
            && *code != game.code
        {
            match self.codes.entry(code.clone()) {
                Entry::Occupied(_) => return Err(DbError::UniqueViolation),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.codes.remove(&game.code);
            game.code = code.clone();
        }
        if let Some(limit) = update.max_player_limit {
            game.max_player_limit = limit;
        }
        Ok(Some(game.clone()))
    }

    async fn add_player(&self, code: &str, player_id: UserId) -> DbResult<Option<Game>> {
        let Some(id) = self.id_for_code(code) else {
            return Ok(None);
        };
        let Some(mut game) = self.games.get_mut(&id) else {
            return Ok(None);
        };
        game.players.push(player_id);
        Ok(Some(game.clone()))
    }

    async fn add_quiz(&self, id: GameId, quiz: &Quiz) -> DbResult<Option<Game>> {
        let Some(mut game) = self.games.get_mut(&id) else {
            return Ok(None);
        };
        game.quizes.push(quiz.clone());
        Ok(Some(game.clone()))
    }

    async fn update_quiz(&self, id: GameId, quiz_id: QuizId, update: &QuizUpdate) -> DbResult<Option<Game>> {
        let Some(mut game) = self.games.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(quiz) = game.quizes.iter_mut().find(|q| q.id == quiz_id) {
            if let Some(title) = &update.title {
                quiz.title = title.clone();
            }
            if let Some(questions) = &update.questions {
                quiz.questions = questions.clone();
            }
        }
        Ok(Some(game.clone()))
    }

    async fn remove_quiz(&self, id: GameId, quiz_id: QuizId) -> DbResult<Option<Game>> {
        let Some(mut game) = self.games.get_mut(&id) else {
            return Ok(None);
        };
        game.quizes.retain(|q| q.id != quiz_id);
        Ok(Some(game.clone()))
    }

    async fn delete_game(&self, id: GameId) -> DbResult<Option<Game>> {
        let removed = self.games.remove(&id).map(|(_, g)| g);
        if let Some(game) = &removed {
            self.codes.remove(&game.code);
        }
        Ok(removed)
    }
}
