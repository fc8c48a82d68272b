mod game;
mod game_db;
mod game_mem;
mod user;
mod user_db;
mod user_mem;

pub use game::GameRepo;
pub use game_db::GameRepository;
pub use game_mem::MemoryGameRepo;
pub use user::UserRepo;
pub use user_db::UserRepository;
pub use user_mem::MemoryUserRepo;
