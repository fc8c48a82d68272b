mod auth;

pub use auth::{AuthController, AuthSuccess};
