//! 외부 ID 공급자 로그인 모델

use serde::{Deserialize, Serialize};

/// 상태 토큰 전용 `aud`. 액세스 토큰과 섞이지 않게 합니다.
pub const OAUTH_STATE_AUDIENCE: &str = "oauth_state";

/// 공급자가 확인해 준 사용자 정보
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthUserInfo {
    /// 공급자 이름 (`"google"`)
    pub provider: String,
    /// 공급자 쪽 사용자 식별자
    pub subject: String,
    pub email: String,
    pub name: String,
    /// 공급자가 이메일 소유를 확인했는지 여부
    pub email_verified: bool,
}

/// CSRF 방지용 `state` 값의 서명 클레임
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}
