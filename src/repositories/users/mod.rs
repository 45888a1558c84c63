pub mod memory;
pub mod user_repo;

pub use memory::InMemoryUserRepository;
pub use user_repo::{MongoUserRepository, UserRepository};
