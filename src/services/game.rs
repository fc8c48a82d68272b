use crate::db::repo::GameRepo;
use crate::error::AppResult;
use crate::models::game::{Game, GameUpdate, NewGame, Quiz, QuizUpdate};
use crate::models::types::{GameId, QuizId, UserId};
use std::sync::Arc;

/// CRUD and mutation operations over games and their embedded quizzes.
pub struct GameService {
    repo: Arc<dyn GameRepo>,
}

impl GameService {
    pub fn new(repo: Arc<dyn GameRepo>) -> Self {
        Self { repo }
    }

    pub async fn create_game(&self, game: NewGame) -> AppResult<Game> {
        Ok(self.repo.insert_game(game).await?)
    }

    pub async fn get_game_by_id(&self, id: GameId) -> AppResult<Option<Game>> {
        Ok(self.repo.get_by_id(id).await?)
    }

    pub async fn get_game_by_code(&self, code: &str) -> AppResult<Option<Game>> {
        Ok(self.repo.get_by_code(code).await?)
    }

    pub async fn get_all_games_by_creator_id(&self, creator_id: UserId) -> AppResult<Vec<Game>> {
        Ok(self.repo.get_by_creator(creator_id).await?)
    }

    /// Player list of a game; empty when the game does not exist.
    pub async fn get_all_players_with_game_id(&self, id: GameId) -> AppResult<Vec<UserId>> {
        let Some(game) = self.repo.get_by_id(id).await? else {
            return Ok(Vec::new());
        };
        Ok(game.players)
    }

    pub async fn is_game_code_unique(&self, code: &str) -> AppResult<bool> {
        Ok(self.repo.get_by_code(code).await?.is_none())
    }

    /// True iff the game's player count strictly exceeds its limit. A
    /// missing game has trivially not reached any limit.
    pub async fn has_game_with_code_reached_limit(&self, code: &str) -> AppResult<bool> {
        let Some(game) = self.repo.get_by_code(code).await? else {
            return Ok(false);
        };
        Ok(game.is_over_limit())
    }

    pub async fn update_game(&self, id: GameId, update: &GameUpdate) -> AppResult<Option<Game>> {
        Ok(self.repo.update_game(id, update).await?)
    }

    /// Atomic append at the storage layer; limit enforcement is the
    /// caller's job, checked before insertion.
    pub async fn add_player_to_game_with_code(&self, code: &str, player_id: UserId) -> AppResult<Option<Game>> {
        Ok(self.repo.add_player(code, player_id).await?)
    }

    pub async fn add_quiz_to_game(&self, id: GameId, quiz: &Quiz) -> AppResult<Option<Game>> {
        Ok(self.repo.add_quiz(id, quiz).await?)
    }

    pub async fn update_quiz(&self, id: GameId, quiz_id: QuizId, update: &QuizUpdate) -> AppResult<Option<Game>> {
        Ok(self.repo.update_quiz(id, quiz_id, update).await?)
    }

    pub async fn remove_quiz_from_game(&self, id: GameId, quiz_id: QuizId) -> AppResult<Option<Game>> {
        Ok(self.repo.remove_quiz(id, quiz_id).await?)
    }

    pub async fn delete_game(&self, id: GameId) -> AppResult<Option<Game>> {
        Ok(self.repo.delete_game(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::MemoryGameRepo;
    use serde_json::json;

    fn svc() -> GameService {
        GameService::new(Arc::new(MemoryGameRepo::new()))
    }

    async fn seeded(svc: &GameService, code: &str, limit: i32) -> Game {
        svc.create_game(NewGame::new(code, UserId::new(), limit)).await.unwrap()
    }

    #[tokio::test]
    async fn t_create_and_lookup() {
        let games = svc();
        let game = seeded(&games, "XK42", 4).await;
        assert!(game.players.is_empty());
        assert!(game.quizes.is_empty());

        let by_id = games.get_game_by_id(game.id).await.unwrap().unwrap();
        assert_eq!(by_id.code, "XK42");
        let by_code = games.get_game_by_code("XK42").await.unwrap().unwrap();
        assert_eq!(by_code.id, game.id);

        assert!(!games.is_game_code_unique("XK42").await.unwrap());
        assert!(games.is_game_code_unique("other").await.unwrap());
    }

    #[tokio::test]
    async fn t_games_by_creator() {
        let games = svc();
        let creator = UserId::new();
        games.create_game(NewGame::new("a", creator, 4)).await.unwrap();
        games.create_game(NewGame::new("b", creator, 4)).await.unwrap();
        games.create_game(NewGame::new("c", UserId::new(), 4)).await.unwrap();

        let mine = games.get_all_games_by_creator_id(creator).await.unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[tokio::test]
    async fn t_concurrent_joins_lose_nothing() {
        let games = Arc::new(svc());
        seeded(&games, "XK42", 32).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let games = games.clone();
            handles.push(tokio::spawn(async move {
                games.add_player_to_game_with_code("XK42", UserId::new()).await.unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let game = games.get_game_by_code("XK42").await.unwrap().unwrap();
        assert_eq!(game.players.len(), 16);
    }

    #[tokio::test]
    async fn t_limit_is_strictly_greater() {
        let games = svc();
        let game = seeded(&games, "XK42", 2).await;

        games.add_player_to_game_with_code("XK42", UserId::new()).await.unwrap();
        games.add_player_to_game_with_code("XK42", UserId::new()).await.unwrap();
        // at the limit, not past it
        assert!(!games.has_game_with_code_reached_limit("XK42").await.unwrap());

        games.add_player_to_game_with_code("XK42", UserId::new()).await.unwrap();
        assert!(games.has_game_with_code_reached_limit("XK42").await.unwrap());

        // players list is available through the id as well
        let players = games.get_all_players_with_game_id(game.id).await.unwrap();
        assert_eq!(players.len(), 3);

        // unknown code never reaches a limit
        assert!(!games.has_game_with_code_reached_limit("nope").await.unwrap());
    }

    #[tokio::test]
    async fn t_quiz_lifecycle() {
        let games = svc();
        let game = seeded(&games, "XK42", 4).await;

        let quiz = Quiz {
            id: QuizId::new(),
            title: "Capitals".into(),
            questions: vec![json!({"q": "Capital of France?", "a": "Paris"})],
        };
        let game2 = games.add_quiz_to_game(game.id, &quiz).await.unwrap().unwrap();
        assert_eq!(game2.quizes.len(), 1);

        // title-only patch keeps the questions
        let patched = games
            .update_quiz(
                game.id,
                quiz.id,
                &QuizUpdate {
                    title: Some("Capitals of Europe".into()),
                    questions: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.quizes[0].title, "Capitals of Europe");
        assert_eq!(patched.quizes[0].questions, quiz.questions);
        assert_eq!(patched.quizes[0].id, quiz.id);

        let emptied = games.remove_quiz_from_game(game.id, quiz.id).await.unwrap().unwrap();
        assert!(emptied.quizes.is_empty());
    }

    #[tokio::test]
    async fn t_update_and_delete_game() {
        let games = svc();
        let game = seeded(&games, "XK42", 4).await;

        let updated = games
            .update_game(
                game.id,
                &GameUpdate {
                    code: None,
                    max_player_limit: Some(8),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.max_player_limit, 8);
        assert_eq!(updated.code, "XK42");

        let deleted = games.delete_game(game.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, game.id);
        assert!(games.get_game_by_id(game.id).await.unwrap().is_none());
        assert!(games.is_game_code_unique("XK42").await.unwrap());
    }
}
