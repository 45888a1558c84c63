//! 토큰 갱신 및 로그아웃

use actix_web::{http::header, post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::domain::dto::tokens::{MessageResponse, RefreshTokenRequest, TokenRefreshResponse};
use crate::errors::AppError;
use crate::services::auth::SessionManager;

/// 리프레시 토큰 회전
///
/// 제출된 리프레시 토큰은 소비되어 더 이상 사용할 수 없습니다.
#[post("/refresh")]
pub async fn refresh_token_handler(
    payload: web::Json<RefreshTokenRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;

    let pair = sessions.refresh(&payload.refresh_token).await?;

    Ok(HttpResponse::Ok().json(TokenRefreshResponse::from(pair)))
}

/// 현재 액세스 토큰을 폐기 목록에 등록합니다.
#[post("/logout")]
pub async fn logout_handler(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    sessions.logout(authorization).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::success("Logged out successfully")))
}
