//! # Domain Entities
//!
//! MongoDB 컬렉션에 그대로 저장되는 영속 엔티티입니다.
//!
//! | 엔티티 | 컬렉션 | 유일 키 |
//! |--------|--------|---------|
//! | [`users::User`] | `users` | `email`, `username` |
//! | [`tokens::RefreshTokenRecord`] | `refresh_tokens` | `token_hash` |
//!
//! 액세스 토큰은 서명된 자기완결 값이므로 저장하지 않습니다.

pub mod tokens;
pub mod users;
