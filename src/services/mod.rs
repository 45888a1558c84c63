//! # Service Layer
//!
//! 비즈니스 로직 계층. 모든 서비스는 생성자에서 설정과 저장소를 주입받습니다.

pub mod auth;
pub mod users;
