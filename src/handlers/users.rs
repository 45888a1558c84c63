//! 인증된 사용자 전용 엔드포인트 (`/user/*`)
//!
//! 모든 핸들러는 `AuthMiddleware` 뒤에 마운트되어 `AuthenticatedUser`를 받습니다.

use actix_web::{get, put, web, HttpResponse};
use validator::Validate;

use crate::domain::dto::tokens::MessageResponse;
use crate::domain::dto::users::{ChangePasswordRequest, UpdateProfileRequest, UserResponse};
use crate::domain::models::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::services::users::UserService;

#[get("/profile")]
pub async fn get_profile(
    auth: AuthenticatedUser,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.get_profile(&auth.user_id).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[put("/profile")]
pub async fn update_profile(
    auth: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;

    let user = users
        .update_profile(&auth.user_id, payload.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// 비밀번호 변경
///
/// 성공하면 해당 사용자의 리프레시 토큰이 모두 폐기됩니다.
#[put("/password")]
pub async fn change_password(
    auth: AuthenticatedUser,
    payload: web::Json<ChangePasswordRequest>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;

    users
        .change_password(&auth.user_id, payload.into_inner())
        .await?;

    log::info!("비밀번호 변경 완료 - 사용자 ID: {}", auth.user_id);

    Ok(HttpResponse::Ok().json(MessageResponse::success("Password changed successfully")))
}
