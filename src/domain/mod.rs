//! # Domain Layer
//!
//! - [`entities`] - 저장되는 엔티티 (User, RefreshTokenRecord)
//! - [`models`] - 저장되지 않는 값 (JWT 클레임, 인증 주체, OAuth 사용자 정보)
//! - [`dto`] - HTTP 요청/응답

pub mod dto;
pub mod entities;
pub mod models;
