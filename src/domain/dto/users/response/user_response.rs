use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::users::{Role, User};
use crate::utils::time_utils::to_chrono;

/// 외부로 노출되는 사용자 정보 (비밀번호 해시와 일회성 토큰 제외)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub username: String,
    pub role: Role,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let User {
            id,
            email,
            name,
            username,
            role,
            is_verified,
            email_verified_at,
            created_at,
            updated_at,
            ..
        } = user;

        Self {
            id: id.map(|id| id.to_hex()).unwrap_or_default(),
            email,
            name,
            username,
            role,
            is_verified,
            email_verified_at: email_verified_at.map(to_chrono),
            created_at: to_chrono(created_at),
            updated_at: to_chrono(updated_at),
        }
    }
}

/// 회원가입 응답 `{status, message, token, user}`
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub status: String,
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

impl RegisterResponse {
    pub fn new(user: User, token: String) -> Self {
        Self {
            status: "success".to_string(),
            message: "User registered successfully".to_string(),
            token,
            user: UserResponse::from(user),
        }
    }
}

/// 로그인 응답 `{status, message, token, refresh_token, user}`
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    pub message: String,
    pub token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

impl LoginResponse {
    pub fn new(user: User, token: String, refresh_token: String) -> Self {
        Self {
            status: "success".to_string(),
            message: "Login successful".to_string(),
            token,
            refresh_token,
            user: UserResponse::from(user),
        }
    }
}
