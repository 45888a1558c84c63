//! # Domain Models
//!
//! 저장되지 않는 도메인 값: JWT 클레임, 인증된 요청 주체, OAuth 공급자 정보.

pub mod auth;
pub mod oauth;
pub mod token;
