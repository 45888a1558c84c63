//! 인증/세션 서비스
//!
//! - [`token_service`] - 액세스 토큰 코덱
//! - [`revocation_service`] - 폐기 토큰 레지스트리
//! - [`refresh_token_service`] - 일회용 리프레시 토큰 저장소
//! - [`oauth_service`] - 외부 ID 공급자 (Google)
//! - [`session_service`] - 로그인/인증/갱신/로그아웃/재설정/인증 흐름

pub mod oauth_service;
pub mod refresh_token_service;
pub mod revocation_service;
pub mod session_service;
pub mod token_service;

pub use oauth_service::{GoogleOAuthProvider, OAuthProvider};
pub use refresh_token_service::{IssuedRefreshToken, RefreshTokenError, RefreshTokenService};
pub use revocation_service::{InMemoryRevocationRegistry, RedisRevocationRegistry, RevocationRegistry};
pub use session_service::{SessionManager, PASSWORD_RESET_MESSAGE};
pub use token_service::{extract_bearer_token, TokenCodec, TokenError};
