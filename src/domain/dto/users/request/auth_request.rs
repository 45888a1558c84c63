//! 인증 요청관련 DTO
//!
//! 회원가입, 로그인, 비밀번호 재설정, 이메일 인증 요청을 매핑합니다.

use serde::Deserialize;
use validator::Validate;

/// 회원가입 요청
///
/// ```json
/// { "email": "alice@example.com", "name": "Alice", "password": "wonderland" }
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "이름은 1-100자 사이여야 합니다"))]
    pub name: String,

    #[validate(length(min = 1, max = 72, message = "비밀번호는 1-72자 사이여야 합니다"))]
    pub password: String,
}

/// 로그인 요청
///
/// 이메일 형식은 검사하지 않습니다. 형식이 틀려도 일반 자격 증명 실패(401)로 응답합니다.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub email: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "재설정 토큰이 필요합니다"))]
    pub token: String,

    #[validate(length(min = 1, max = 72, message = "비밀번호는 1-72자 사이여야 합니다"))]
    pub new_password: String,
}

/// `GET /auth/verify?token=...`
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

/// `GET /auth/google/callback?code=...&state=...`
///
/// 사용자가 동의를 거부하면 `code` 대신 `error`가 옵니다.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
