//! HTTP 핸들러
//!
//! 핸들러는 요청 검증과 응답 조립만 담당하고, 규칙은 서비스 계층에 위임합니다.

pub mod auth;
pub mod oauth;
pub mod token_handlers;
pub mod users;
