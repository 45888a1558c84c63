//! 세션 인증 서비스 메인 애플리케이션
//!
//! Actix-web 기반의 HTTP 서버를 구동하고 모든 서비스를 초기화합니다.
//! 설정에 따라 MongoDB/Redis 또는 메모리 저장소를 연결하고 JWT 인증 REST API를 제공합니다.

use std::io;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};
use session_auth_backend::config::AppConfig;
use session_auth_backend::core::AppContext;
use session_auth_backend::middlewares::security_headers;
use session_auth_backend::routes::configure_all_routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_file();
    init_logging();

    info!("🚀 세션 인증 서비스 시작중...");

    let config = AppConfig::from_env();

    let ctx = AppContext::connect(config).await.map_err(|e| {
        error!("❌ 서비스 초기화 실패: {}", e);
        io::Error::other(e.to_string())
    })?;

    match ctx.users.seed_super_admin().await {
        Ok(true) => info!("👑 슈퍼관리자 계정 생성 완료"),
        Ok(false) => info!("슈퍼관리자 계정이 이미 존재합니다"),
        Err(e) => error!("❌ 슈퍼관리자 시딩 실패: {}", e),
    }

    if !ctx.config.google.is_configured() {
        warn!("⚠️ GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET 미설정: Google 로그인은 503을 반환합니다");
    }

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    let maintenance = ctx.spawn_maintenance();
    let result = start_http_server(ctx.clone()).await;

    maintenance.abort();
    ctx.shutdown();

    result
}

/// HTTP 서버를 구성하고 실행합니다
///
/// Rate Limiting, CORS, 보안 헤더, 로깅, 경로 정규화 미들웨어를 포함합니다.
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server(ctx: AppContext) -> io::Result<()> {
    let bind_address = ctx.config.server.bind_address();
    let workers = ctx.config.server.workers;
    let rate_limit = ctx.config.rate_limit.clone();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);

    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit.per_second)
        .burst_size(rate_limit.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::other("Rate Limiting 설정이 올바르지 않습니다"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit.per_second, rate_limit.burst_size
    );

    let sessions = web::Data::from(ctx.sessions.clone());
    let users = web::Data::from(ctx.users.clone());
    let oauth = web::Data::from(ctx.oauth.clone());
    let frontend_url = ctx.config.account.frontend_url.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(sessions.clone())
            .app_data(users.clone())
            .app_data(oauth.clone())
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors(&frontend_url))
            .wrap(security_headers())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
    .bind(bind_address)?
    .workers(workers)
    .run()
    .await
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => {
            if let Err(e) = dotenv::from_filename(".env.prod") {
                eprintln!(".env.prod 파일 로드 실패: {}", e);
            }
        }
        "dev" => {
            if let Err(e) = dotenv::from_filename(".env.dev") {
                eprintln!(".env.dev 파일 로드 실패: {}", e);
            }
        }
        _ => {
            dotenv().ok();
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// `RUST_LOG`가 없으면 "info,actix_web=debug"를 사용합니다.
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// CORS 설정을 구성합니다
///
/// 로컬 개발 서버와 `FRONTEND_URL`에서 오는 요청을 허용합니다.
fn configure_cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8000")
        .allowed_origin("http://127.0.0.1:8000")
        .allowed_origin(frontend_url.trim_end_matches('/'))
        .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}
