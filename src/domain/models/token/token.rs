//! JWT 클레임과 발급된 토큰 묶음

use serde::{Deserialize, Serialize};

use crate::domain::entities::users::Role;

/// 액세스 토큰 클레임
///
/// 모든 필드가 필수이며, 하나라도 없거나 타입이 다르면 디코딩이 실패합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 사용자 ID (ObjectId hex)
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    /// 같은 초에 발급된 토큰도 서로 구분되도록 하는 고유 ID
    pub jti: String,
}

/// 로그인/갱신 시 발급되는 액세스 + 리프레시 토큰
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
