mod auth;
mod game;
mod user;
pub mod validation;

pub use auth::{AuthService, Claims};
pub use game::GameService;
pub use user::UserService;
