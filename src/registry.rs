use crate::config::Config;
use crate::controllers::AuthController;
use crate::db::Db;
use crate::db::repo::{GameRepo, GameRepository, MemoryGameRepo, MemoryUserRepo, UserRepo, UserRepository};
use crate::services::{AuthService, GameService, UserService};
use std::sync::Arc;

pub struct Repos {
    pub users: Arc<dyn UserRepo>,
    pub games: Arc<dyn GameRepo>,
}

pub struct Services {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub games: Arc<GameService>,
}

pub struct Controllers {
    pub auth: AuthController,
}

/// Central wiring of stores, services and controllers. Built once at
/// startup; requests share it behind an Arc.
pub struct Registry {
    pub repos: Arc<Repos>,
    pub services: Arc<Services>,
    pub controllers: Controllers,
    pub config: Arc<Config>,
}

impl Registry {
    /// Wires the persistent (Postgres) stores.
    pub fn new(db: Arc<Db>, config: Arc<Config>) -> Self {
        let repos = Arc::new(Repos {
            users: Arc::new(UserRepository::new(db.clone())),
            games: Arc::new(GameRepository::new(db)),
        });
        Self::wire(repos, config)
    }

    /// Wires the ephemeral in-memory stores. Used by tests and local runs
    /// without a database.
    pub fn in_memory(config: Arc<Config>) -> Self {
        let repos = Arc::new(Repos {
            users: Arc::new(MemoryUserRepo::new()),
            games: Arc::new(MemoryGameRepo::new()),
        });
        Self::wire(repos, config)
    }

    fn wire(repos: Arc<Repos>, config: Arc<Config>) -> Self {
        let auth_service = Arc::new(AuthService::new(config.jwt_secret.as_bytes(), config.jwt_ttl_secs));
        let user_service = Arc::new(UserService::new(repos.users.clone()));
        let game_service = Arc::new(GameService::new(repos.games.clone()));

        let controllers = Controllers {
            auth: AuthController::new(
                auth_service.clone(),
                user_service.clone(),
                config.default_players_limit,
            ),
        };

        Self {
            repos,
            services: Arc::new(Services {
                auth: auth_service,
                users: user_service,
                games: game_service,
            }),
            controllers,
            config,
        }
    }
}
