//! 세션 인증 서비스 백엔드
//!
//! 이메일/비밀번호 계정에 대한 JWT 기반 인증 서비스입니다.
//! 짧은 수명의 액세스 토큰과 회전되는 리프레시 토큰을 발급하고,
//! 로그아웃된 액세스 토큰은 만료될 때까지 폐기 레지스트리에 보관합니다.
//!
//! # Features
//!
//! - **계정 관리**: 회원가입, 이메일 인증, 프로필 수정, 비밀번호 변경
//! - **JWT 인증**: HS256 액세스 토큰 + 1회용 리프레시 토큰
//! - **Google 로그인**: OAuth 2.0 코드 교환 후 같은 세션 발급 (공급자 trait 뒤에 분리)
//! - **로그아웃**: 메모리 또는 Redis 기반 토큰 폐기 레지스트리
//! - **비밀번호 재설정**: 계정 존재 여부를 드러내지 않는 재설정 흐름
//! - **저장소**: MongoDB 또는 메모리 (테스트/로컬)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← REST API 엔드포인트 + 인증 미들웨어
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청 검증/응답 조립
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← SessionManager, UserService, TokenCodec
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← 사용자/리프레시 토큰 저장소, 폐기 레지스트리
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ MongoDB / Redis │ ← 또는 프로세스 메모리
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use session_auth_backend::config::AppConfig;
//! use session_auth_backend::core::AppContext;
//!
//! let ctx = AppContext::connect(AppConfig::from_env()).await?;
//! let (user, pair) = ctx.sessions.login("alice@example.com", "pw1").await?;
//! ```

pub mod caching;
pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;
