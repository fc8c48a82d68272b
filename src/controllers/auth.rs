use crate::db::error::DbError;
use crate::error::{AuthError, DomainError};
use crate::models::user::{NewUser, User, UserDto};
use crate::services::validation::{AuthBody, AuthRequest, validate_auth_request_body};
use crate::services::{AuthService, UserService};
use serde::Serialize;
use std::sync::Arc;

/// Success body for both auth routes.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSuccess {
    pub user: UserDto,
    pub token: String,
}

/// Orchestrates validation, the user store and the token codec for the two
/// auth flows. Holds no per-request state; the configured player limit is
/// injected at construction.
pub struct AuthController {
    auth: Arc<AuthService>,
    users: Arc<UserService>,
    default_players_limit: i64,
}

impl AuthController {
    pub fn new(auth: Arc<AuthService>, users: Arc<UserService>, default_players_limit: i64) -> Self {
        Self {
            auth,
            users,
            default_players_limit,
        }
    }

    /// Register a creator or join a player to a game code.
    ///
    /// Validation happens strictly before any write, and the token is only
    /// issued once a user record exists. The creator-username check here is
    /// advisory; the store's unique constraint is the authoritative guard,
    /// and a losing concurrent insert comes back as DuplicateUsername.
    pub async fn register(&self, body: &AuthBody) -> Result<AuthSuccess, AuthError> {
        let req = validate_auth_request_body(body)?;

        match &req {
            AuthRequest::Creator { username, .. } => {
                if !self.users.is_username_unique(username).await.map_err(AuthError::Persistence)? {
                    return Err(AuthError::DuplicateUsername);
                }
            }
            AuthRequest::Player { code, .. } => {
                let count = self
                    .users
                    .get_number_of_users_with_code(code)
                    .await
                    .map_err(AuthError::Persistence)?;
                if count >= self.default_players_limit {
                    return Err(AuthError::PlayerLimitReached);
                }
            }
        }

        let user = match req {
            AuthRequest::Creator { username, password } => {
                let hash = self.auth.hash_password(&password).map_err(AuthError::Unknown)?;
                match self.users.create_user(NewUser::creator(username, hash)).await {
                    Ok(user) => user,
                    // lost the race against a concurrent registration
                    Err(DomainError::Db(DbError::UniqueViolation)) => {
                        return Err(AuthError::DuplicateUsername);
                    }
                    Err(e) => return Err(AuthError::Persistence(e)),
                }
            }
            AuthRequest::Player { username, code } => {
                // A same-named player rejoins as the same identity instead
                // of erroring or duplicating. The lookup is player-scoped so
                // a creator with the same username cannot shadow it.
                let existing = self
                    .users
                    .get_player_by_username(&username)
                    .await
                    .map_err(AuthError::Persistence)?;
                match existing {
                    Some(player) => player,
                    None => self
                        .users
                        .create_user(NewUser::player(username, code))
                        .await
                        .map_err(AuthError::Persistence)?,
                }
            }
        };

        self.respond(&user)
    }

    /// Authenticate a creator by username and password. Players are
    /// identified via register/join and may never log in.
    pub async fn login(&self, body: &AuthBody) -> Result<AuthSuccess, AuthError> {
        if body.is_player() {
            return Err(AuthError::ForbiddenActor);
        }

        let req = validate_auth_request_body(body)?;
        let AuthRequest::Creator { username, password } = req else {
            return Err(AuthError::ForbiddenActor);
        };

        let user = self
            .users
            .get_user_by_username(&username)
            .await
            .map_err(AuthError::Persistence)?
            .ok_or(AuthError::UserNotFound)?;

        // A player record found under a creator login has no hash to check
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AuthError::InvalidCredentials);
        };
        if !self.auth.is_password_match(&password, hash).map_err(AuthError::Unknown)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.respond(&user)
    }

    fn respond(&self, user: &User) -> Result<AuthSuccess, AuthError> {
        let dto = UserDto::from(user);
        let token = self.auth.encode_jwt(&dto).map_err(AuthError::Unknown)?;
        Ok(AuthSuccess { user: dto, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbResult;
    use crate::db::repo::{MemoryUserRepo, UserRepo};
    use crate::models::user::UserKind;

    const LIMIT: i64 = 3;

    fn controller() -> AuthController {
        let auth = Arc::new(AuthService::new(b"test-secret", 3600));
        let users = Arc::new(UserService::new(Arc::new(MemoryUserRepo::new())));
        AuthController::new(auth, users, LIMIT)
    }

    fn creator_body(username: &str, password: &str) -> AuthBody {
        AuthBody {
            kind: Some("creator".into()),
            username: Some(username.into()),
            password: Some(password.into()),
            code: None,
        }
    }

    fn player_body(username: &str, code: &str) -> AuthBody {
        AuthBody {
            kind: Some("player".into()),
            username: Some(username.into()),
            password: None,
            code: Some(code.into()),
        }
    }

    #[tokio::test]
    async fn t_register_creator() {
        let ctl = controller();
        let out = ctl.register(&creator_body("alice", "hunter2")).await.unwrap();

        assert_eq!(out.user.username, "alice");
        assert_eq!(out.user.kind, UserKind::Creator);
        assert_eq!(out.user.code, None);

        // serialized DTO carries no password in any form
        let body = serde_json::to_value(&out.user).unwrap();
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());

        // token round-trips the identity
        let auth = AuthService::new(b"test-secret", 3600);
        let claims = auth.decode_jwt(&out.token).unwrap();
        assert_eq!(claims.sub, out.user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.kind, UserKind::Creator);
    }

    #[tokio::test]
    async fn t_register_duplicate_creator() {
        let ctl = controller();
        ctl.register(&creator_body("alice", "hunter2")).await.unwrap();

        let err = ctl.register(&creator_body("alice", "other")).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
        assert_eq!(err.status(), 400);
        assert_eq!(err.to_string(), "Username must be unique");
    }

    #[tokio::test]
    async fn t_register_player_and_rejoin() {
        let ctl = controller();
        let first = ctl.register(&player_body("bob", "XK42")).await.unwrap();
        assert_eq!(first.user.kind, UserKind::Player);
        assert_eq!(first.user.code.as_deref(), Some("XK42"));

        // same username under the same flow rejoins the same identity
        let second = ctl.register(&player_body("bob", "XK42")).await.unwrap();
        assert_eq!(second.user.id, first.user.id);
    }

    #[tokio::test]
    async fn t_register_player_rejoin_with_creator_name() {
        let ctl = controller();
        let creator = ctl.register(&creator_body("bob", "hunter2")).await.unwrap();

        // the creator holding the name does not shadow the player identity
        let first = ctl.register(&player_body("bob", "XK42")).await.unwrap();
        assert_ne!(first.user.id, creator.user.id);
        assert_eq!(first.user.kind, UserKind::Player);

        let second = ctl.register(&player_body("bob", "XK42")).await.unwrap();
        assert_eq!(second.user.id, first.user.id);
    }

    /// Store double that reports every creator username as free, simulating
    /// a concurrent registration winning between the advisory check and the
    /// insert.
    struct RacingUserRepo(MemoryUserRepo);

    #[async_trait::async_trait]
    impl UserRepo for RacingUserRepo {
        async fn is_username_unique(&self, _username: &str) -> DbResult<bool> {
            Ok(true)
        }

        async fn count_users_with_code(&self, code: &str) -> DbResult<i64> {
            self.0.count_users_with_code(code).await
        }

        async fn insert_user(&self, user: NewUser) -> DbResult<User> {
            self.0.insert_user(user).await
        }

        async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
            self.0.get_by_username(username).await
        }

        async fn get_player_by_username(&self, username: &str) -> DbResult<Option<User>> {
            self.0.get_player_by_username(username).await
        }
    }

    #[tokio::test]
    async fn t_register_duplicate_lost_race() {
        let auth = Arc::new(AuthService::new(b"test-secret", 3600));
        let users = Arc::new(UserService::new(Arc::new(RacingUserRepo(MemoryUserRepo::new()))));
        let ctl = AuthController::new(auth, users, LIMIT);

        ctl.register(&creator_body("alice", "hunter2")).await.unwrap();

        // the advisory check passes; the store's unique constraint is the
        // authoritative guard and the losing insert surfaces as a duplicate
        let err = ctl.register(&creator_body("alice", "other")).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn t_register_player_limit() {
        let ctl = controller();
        for i in 0..LIMIT {
            ctl.register(&player_body(&format!("p{i}"), "XK42")).await.unwrap();
        }

        let err = ctl.register(&player_body("late", "XK42")).await.unwrap_err();
        assert!(matches!(err, AuthError::PlayerLimitReached));
        assert_eq!(err.to_string(), "Players limit reached for that code");

        // a different code is unaffected
        ctl.register(&player_body("late", "other")).await.unwrap();
    }

    #[tokio::test]
    async fn t_register_validation_fails_fast() {
        let ctl = controller();
        let err = ctl
            .register(&AuthBody {
                kind: Some("creator".into()),
                username: Some("alice".into()),
                password: None,
                code: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn t_login_player_forbidden() {
        let ctl = controller();
        // rejected regardless of any other field
        let err = ctl.login(&player_body("bob", "XK42")).await.unwrap_err();
        assert!(matches!(err, AuthError::ForbiddenActor));
        assert_eq!(err.status(), 403);
    }

    #[tokio::test]
    async fn t_login_unknown_user() {
        let ctl = controller();
        let err = ctl.login(&creator_body("nobody", "hunter2")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
        assert_eq!(err.to_string(), "User with that username does not exist");
    }

    #[tokio::test]
    async fn t_login_wrong_password() {
        let ctl = controller();
        ctl.register(&creator_body("alice", "hunter2")).await.unwrap();

        let err = ctl.login(&creator_body("alice", "wrong")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid Password");
    }

    #[tokio::test]
    async fn t_login_ok() {
        let ctl = controller();
        let registered = ctl.register(&creator_body("alice", "hunter2")).await.unwrap();

        let out = ctl.login(&creator_body("alice", "hunter2")).await.unwrap();
        assert_eq!(out.user.id, registered.user.id);

        let auth = AuthService::new(b"test-secret", 3600);
        let claims = auth.decode_jwt(&out.token).unwrap();
        assert_eq!(claims.sub, registered.user.id);
    }
}
