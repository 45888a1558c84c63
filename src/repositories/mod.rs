//! # Repository Layer
//!
//! 저장소 접근 경계입니다. 서비스는 trait 객체(`Arc<dyn ...>`)만 알고,
//! 구현은 기동 시 설정(`STORAGE_BACKEND`)에 따라 선택됩니다.
//!
//! | trait | MongoDB | 메모리 |
//! |-------|---------|--------|
//! | [`users::UserRepository`] | [`users::MongoUserRepository`] | [`users::InMemoryUserRepository`] |
//! | [`tokens::RefreshTokenRepository`] | [`tokens::MongoRefreshTokenRepository`] | [`tokens::InMemoryRefreshTokenRepository`] |

pub mod tokens;
pub mod users;
