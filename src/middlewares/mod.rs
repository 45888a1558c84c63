//! 미들웨어 모듈
//!
//! 요청 처리 파이프라인의 횡단 관심사를 담당합니다.
//!
//! - [`AuthMiddleware`] - Bearer 액세스 토큰 인증 (폐기 여부 + 서명/만료 검증)
//! - [`security_headers`] - 보안 응답 헤더
//!
//! ```rust,ignore
//! App::new()
//!     .wrap(security_headers())
//!     .service(
//!         web::scope("/user")
//!             .wrap(AuthMiddleware::required())
//!             .service(get_profile)
//!     )
//! ```

mod auth_inner;
pub mod auth_middleware;
pub mod security_headers;

pub use auth_middleware::AuthMiddleware;
pub use security_headers::security_headers;
