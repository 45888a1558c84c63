//! 보안 응답 헤더
//!
//! 모든 응답에 XSS/MIME 스니핑/클릭재킹/HSTS 헤더를 붙입니다.

use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;

pub const HSTS_MAX_AGE_SECONDS: u32 = 31_536_000;

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_XSS_PROTECTION, "1; mode=block"))
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "DENY"))
        .add((
            header::STRICT_TRANSPORT_SECURITY,
            format!("max-age={}", HSTS_MAX_AGE_SECONDS),
        ))
}
