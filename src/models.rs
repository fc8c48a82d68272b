pub mod game;
pub mod types;
pub mod user;
