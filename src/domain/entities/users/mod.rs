//! Users Entity Module
//!
//! 사용자 엔티티와 역할 정의

pub mod role;
pub mod user;

pub use role::Role;
pub use user::User;
