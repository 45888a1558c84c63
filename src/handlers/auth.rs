//! 인증 관련 공개 엔드포인트 (`/auth/*`)

use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::domain::dto::tokens::MessageResponse;
use crate::domain::dto::users::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    ResetPasswordRequest, VerifyEmailQuery,
};
use crate::errors::AppError;
use crate::services::auth::SessionManager;
use crate::services::users::UserService;

/// 회원가입
///
/// 계정을 만들고 바로 사용할 수 있는 액세스 토큰을 돌려줍니다.
/// 리프레시 토큰은 로그인 시에만 발급됩니다.
#[post("/register")]
pub async fn register(
    payload: web::Json<RegisterRequest>,
    users: web::Data<UserService>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;

    let user = users.register(payload.into_inner()).await?;
    let token = sessions.issue_access_token(&user)?;

    Ok(HttpResponse::Created().json(RegisterResponse::new(user, token)))
}

#[post("/login")]
pub async fn login(
    payload: web::Json<LoginRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;

    let (user, pair) = sessions.login(&payload.email, &payload.password).await?;

    log::info!("로그인 성공 - 사용자: {}", user.email);

    Ok(HttpResponse::Ok().json(LoginResponse::new(user, pair.access_token, pair.refresh_token)))
}

#[get("/verify")]
pub async fn verify_email(
    query: web::Query<VerifyEmailQuery>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let token = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::ValidationError("인증 토큰이 필요합니다".to_string()))?;

    sessions.verify_email(token).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::success("Email verified successfully")))
}

/// 비밀번호 재설정 요청
///
/// 계정 존재 여부와 상관없이 항상 같은 응답을 돌려줍니다.
#[post("/forgot-password")]
pub async fn forgot_password(
    payload: web::Json<ForgotPasswordRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;

    let message = sessions.request_password_reset(&payload.email).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::success(message)))
}

#[post("/reset-password")]
pub async fn reset_password(
    payload: web::Json<ResetPasswordRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;

    sessions
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::success("Password reset successfully")))
}
