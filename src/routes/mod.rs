//! API 라우트 설정 모듈
//!
//! 엔드포인트를 기능별로 묶어 등록합니다.
//!
//! - `/auth/*` - 회원가입, 로그인, Google 로그인, 토큰 갱신, 로그아웃, 이메일 인증, 비밀번호 재설정 (공개)
//! - `/user/*` - 프로필 조회/수정, 비밀번호 변경 (Bearer 인증 필요)
//! - `/health` - 헬스체크
//!
//! 로그아웃은 만료·폐기된 토큰으로도 호출될 수 있어야 하므로 인증 미들웨어 밖에 둡니다.
//!
//! ```rust,ignore
//! App::new()
//!     .app_data(web::Data::from(ctx.sessions.clone()))
//!     .app_data(web::Data::from(ctx.users.clone()))
//!     .app_data(web::Data::from(ctx.oauth.clone()))
//!     .configure(configure_all_routes)
//! ```

use actix_web::{get, web, HttpResponse};
use serde_json::json;

use crate::handlers;
use crate::middlewares::AuthMiddleware;

pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);

    configure_auth_routes(cfg);
    configure_user_routes(cfg);
}

fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(handlers::auth::register)
            .service(handlers::auth::login)
            .service(handlers::auth::verify_email)
            .service(handlers::auth::forgot_password)
            .service(handlers::auth::reset_password)
            .service(handlers::oauth::google_login)
            .service(handlers::oauth::google_callback)
            .service(handlers::token_handlers::refresh_token_handler)
            .service(handlers::token_handlers::logout_handler),
    );
}

fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .wrap(AuthMiddleware::required())
            .service(handlers::users::get_profile)
            .service(handlers::users::update_profile)
            .service(handlers::users::change_password),
    );
}

/// 헬스체크 엔드포인트
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "session_auth_backend",
///   "version": "0.1.0",
///   "timestamp": "2026-01-01T00:00:00+00:00"
/// }
/// ```
#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
