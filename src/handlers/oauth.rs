//! 외부 공급자 로그인 엔드포인트 (`/auth/google`, `/auth/google/callback`)

use actix_web::http::header;
use actix_web::{get, route, web, HttpResponse};

use crate::domain::dto::users::{LoginResponse, OAuthCallbackQuery};
use crate::errors::AppError;
use crate::services::auth::{OAuthProvider, SessionManager};

/// 공급자 동의 화면으로 보냅니다.
#[route("/google", method = "GET", method = "POST")]
pub async fn google_login(
    sessions: web::Data<SessionManager>,
    provider: web::Data<dyn OAuthProvider>,
) -> Result<HttpResponse, AppError> {
    let url = sessions.begin_oauth(provider.get_ref())?;

    Ok(HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, url))
        .finish())
}

/// 동의 후 돌아온 요청을 처리하고 로그인 응답과 같은 토큰 쌍을 발급합니다.
#[get("/google/callback")]
pub async fn google_callback(
    query: web::Query<OAuthCallbackQuery>,
    sessions: web::Data<SessionManager>,
    provider: web::Data<dyn OAuthProvider>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();

    if let Some(error) = query.error {
        log::warn!("OAuth 동의 거부/실패: {}", error);
        return Err(AppError::AuthenticationError("OAuth sign-in was not completed".to_string()));
    }

    let code = query
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("Code not found".to_string()))?;
    let state = query.state.unwrap_or_default();

    let (user, pair) = sessions.complete_oauth(provider.get_ref(), &code, &state).await?;

    log::info!("OAuth 로그인 성공 - 사용자: {}", user.email);

    Ok(HttpResponse::Ok().json(LoginResponse::new(user, pair.access_token, pair.refresh_token)))
}
