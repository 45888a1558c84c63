//! HTTP 계층 통합 테스트
//!
//! 메모리 저장소로 조립한 `AppContext`에 전체 라우트와 미들웨어를 올려 검증합니다.

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use session_auth_backend::config::AppConfig;
use session_auth_backend::core::AppContext;
use session_auth_backend::domain::models::oauth::OAuthUserInfo;
use session_auth_backend::errors::{AppError, AppResult};
use session_auth_backend::middlewares::security_headers;
use session_auth_backend::routes::configure_all_routes;
use session_auth_backend::services::auth::OAuthProvider;

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($ctx.sessions.clone()))
                .app_data(web::Data::from($ctx.users.clone()))
                .app_data(web::Data::from($ctx.oauth.clone()))
                .wrap(security_headers())
                .configure(configure_all_routes),
        )
        .await
    };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// 코드 `"good"`만 받아주는 가짜 ID 공급자
struct FakeIdentityProvider;

#[async_trait]
impl OAuthProvider for FakeIdentityProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn authorization_url(&self, state: &str) -> AppResult<String> {
        Ok(format!("https://idp.test/authorize?state={}", state))
    }

    async fn fetch_user(&self, code: &str) -> AppResult<OAuthUserInfo> {
        if code != "good" {
            return Err(AppError::ExternalServiceError("code rejected".to_string()));
        }
        Ok(OAuthUserInfo {
            provider: "google".to_string(),
            subject: "1234567890".to_string(),
            email: "carol@example.com".to_string(),
            name: "Carol Danvers".to_string(),
            email_verified: true,
        })
    }
}

fn oauth_context() -> AppContext {
    AppContext::in_memory(AppConfig::default()).with_oauth_provider(Arc::new(FakeIdentityProvider))
}

#[actix_web::test]
async fn test_register_login_profile_logout() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "alice@example.com", "name": "Alice", "password": "wonderland"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "alice@example.com");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": "wonderland"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "success");
    let token = body["token"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].clone();
    assert!(body["refresh_token"].as_str().is_some());

    let req = test::TestRequest::get()
        .uri("/user/profile")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Alice");
    assert!(body.get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/user/profile")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_short_password_scenario() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "alice@example.com", "name": "Alice", "password": "pw1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": "pw1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/user/profile")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "alice@example.com");

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/user/profile")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_malformed_login_email_is_generic_unauthorized() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "not-an-email", "password": "pw1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid email or password");
}

#[actix_web::test]
async fn test_duplicate_registration_conflicts() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({"email": "Alice@Example.com", "name": "Alice", "password": "wonderland"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_web::test]
async fn test_invalid_registration_is_bad_request() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "not-an-email", "name": "Alice", "password": "wonderland"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_wrong_password_is_unauthorized() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "alice@example.com", "name": "Alice", "password": "wonderland"}))
        .to_request();
    test::call_service(&app, req).await;

    let mut bodies = Vec::new();
    for (email, password) in [
        ("alice@example.com", "looking-glass"),
        ("nobody@example.com", "wonderland"),
    ] {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": email, "password": password}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        bodies.push(test::read_body(resp).await);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[actix_web::test]
async fn test_refresh_rotates_token() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "alice@example.com", "name": "Alice", "password": "wonderland"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": "wonderland"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(json!({"refresh_token": refresh_token}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["access_token"].as_str().is_some());
    assert_ne!(body["refresh_token"].as_str().unwrap(), refresh_token);

    // 이미 소비된 토큰
    let req = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(json!({"refresh_token": refresh_token}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_expired_refresh_token_is_unauthorized() {
    let mut config = AppConfig::default();
    config.jwt.refresh_token_days = 0;
    let ctx = AppContext::in_memory(config);
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "alice@example.com", "name": "Alice", "password": "wonderland"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": "wonderland"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(json!({"refresh_token": body["refresh_token"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "alice@example.com", "name": "Alice", "password": "wonderland"}))
        .to_request();
    test::call_service(&app, req).await;

    let mut bodies = Vec::new();
    for email in ["alice@example.com", "nobody@example.com"] {
        let req = test::TestRequest::post()
            .uri("/auth/forgot-password")
            .set_json(json!({"email": email}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        bodies.push(test::read_body(resp).await);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[actix_web::test]
async fn test_logout_requires_bearer_header() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::post().uri("/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header((header::AUTHORIZATION, "Basic abc"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_profile_requires_token() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/user/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/user/profile")
        .insert_header(bearer("garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_verify_email_flow() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/auth/verify").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/auth/verify?token=unknown")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_change_password_over_http() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "alice@example.com", "name": "Alice", "password": "wonderland"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri("/user/password")
        .insert_header(bearer(&token))
        .set_json(json!({"current_password": "wrong-one", "new_password": "looking-glass"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri("/user/password")
        .insert_header(bearer(&token))
        .set_json(json!({"current_password": "wonderland", "new_password": "looking-glass"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": "looking-glass"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_health_and_security_headers() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let header_value = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    assert_eq!(header_value("x-frame-options").as_deref(), Some("DENY"));
    assert_eq!(header_value("x-content-type-options").as_deref(), Some("nosniff"));
    assert_eq!(header_value("x-xss-protection").as_deref(), Some("1; mode=block"));
    assert_eq!(
        header_value("strict-transport-security").as_deref(),
        Some("max-age=31536000")
    );

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_google_sign_in_flow() {
    let ctx = oauth_context();
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/auth/google").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .to_string();
    let state = location.split("state=").nth(1).unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/auth/google/callback?code=good&state={}", state))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "carol@example.com");
    assert_eq!(body["user"]["is_verified"], true);
    let token = body["token"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].clone();
    assert!(body["refresh_token"].as_str().is_some());

    let req = test::TestRequest::get()
        .uri("/user/profile")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // 두 번째 로그인은 같은 계정을 사용
    let req = test::TestRequest::post().uri("/auth/google").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let req = test::TestRequest::get()
        .uri(&format!("/auth/google/callback?code=good&state={}", state))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["user"]["id"], user_id);
}

#[actix_web::test]
async fn test_google_callback_rejections() {
    let ctx = oauth_context();
    let app = init_app!(ctx);

    let forged = "/auth/google/callback?code=good&state=forged";
    let resp = test::call_service(&app, test::TestRequest::get().uri(forged).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let missing_code = "/auth/google/callback?state=whatever";
    let resp = test::call_service(&app, test::TestRequest::get().uri(missing_code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let denied = "/auth/google/callback?error=access_denied";
    let resp = test::call_service(&app, test::TestRequest::get().uri(denied).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 서명된 state라도 공급자가 코드를 거부하면 502
    let state = ctx.sessions.begin_oauth(&FakeIdentityProvider).unwrap();
    let state = state.split("state=").nth(1).unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/auth/google/callback?code=bad&state={}", state))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Upstream identity provider failed");
}

#[actix_web::test]
async fn test_google_sign_in_unconfigured_is_unavailable() {
    let ctx = AppContext::in_memory(AppConfig::default());
    let app = init_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/auth/google").to_request()).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
