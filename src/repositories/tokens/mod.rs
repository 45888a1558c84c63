pub mod memory;
pub mod refresh_token_repo;

pub use memory::InMemoryRefreshTokenRepository;
pub use refresh_token_repo::{MongoRefreshTokenRepository, RefreshTokenRepository};
