//! 인증 관련 설정
//!
//! JWT 서명 비밀키와 토큰 수명, 계정 흐름(비밀번호 재설정, 시드 계정),
//! Google OAuth 클라이언트 정보를 담습니다.

use std::env;

use chrono::Duration;
use log::warn;

use super::env_in_range;

const INSECURE_DEFAULT_SECRET: &str = "secret";

const DEFAULT_ACCESS_TOKEN_HOURS: i64 = 72;
const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 7;
const DEFAULT_RESET_TOKEN_MINUTES: i64 = 60;

/// JWT 설정
///
/// `TokenCodec`과 `SessionManager`가 생성 시점에 주입받는 불변 값입니다.
///
/// # Environment Variables
///
/// * `JWT_SECRET` - HS256 서명 비밀키 (기본값: `secret`, 경고 로그 출력)
/// * `JWT_EXPIRATION` - 액세스 토큰 수명(시간), 1..=8760, 기본값 72
/// * `REFRESH_TOKEN_EXPIRATION_DAYS` - 리프레시 토큰 수명(일), 1..=365, 기본값 7
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_hours: i64,
    pub refresh_token_days: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("⚠️ JWT_SECRET이 설정되지 않아 기본 비밀키를 사용합니다. 운영 환경에서는 반드시 설정하세요");
            INSECURE_DEFAULT_SECRET.to_string()
        });

        Self {
            secret,
            access_token_hours: env_in_range("JWT_EXPIRATION", DEFAULT_ACCESS_TOKEN_HOURS, 1..=8760),
            refresh_token_days: env_in_range(
                "REFRESH_TOKEN_EXPIRATION_DAYS",
                DEFAULT_REFRESH_TOKEN_DAYS,
                1..=365,
            ),
        }
    }

    /// 음수는 0으로, 표현 불가능한 값은 기본 수명으로 취급합니다.
    pub fn access_token_ttl(&self) -> Duration {
        Duration::try_hours(self.access_token_hours.max(0))
            .unwrap_or_else(|| Duration::hours(DEFAULT_ACCESS_TOKEN_HOURS))
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::try_days(self.refresh_token_days.max(0))
            .unwrap_or_else(|| Duration::days(DEFAULT_REFRESH_TOKEN_DAYS))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret == INSECURE_DEFAULT_SECRET
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: INSECURE_DEFAULT_SECRET.to_string(),
            access_token_hours: DEFAULT_ACCESS_TOKEN_HOURS,
            refresh_token_days: DEFAULT_REFRESH_TOKEN_DAYS,
        }
    }
}

/// 계정 흐름 설정
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// 재설정/인증 링크에 쓰는 프론트엔드 주소
    pub frontend_url: String,
    pub reset_token_minutes: i64,
    pub superadmin_email: String,
    pub superadmin_password: String,
}

impl AccountConfig {
    pub fn from_env() -> Self {
        Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            reset_token_minutes: env_in_range(
                "PASSWORD_RESET_EXPIRATION_MINUTES",
                DEFAULT_RESET_TOKEN_MINUTES,
                1..=1440,
            ),
            superadmin_email: env::var("SUPERADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".to_string()),
            superadmin_password: env::var("SUPERADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin1234".to_string()),
        }
    }

    pub fn reset_token_ttl(&self) -> Duration {
        Duration::try_minutes(self.reset_token_minutes.max(0))
            .unwrap_or_else(|| Duration::minutes(DEFAULT_RESET_TOKEN_MINUTES))
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.frontend_url, token)
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            reset_token_minutes: DEFAULT_RESET_TOKEN_MINUTES,
            superadmin_email: "admin@example.com".to_string(),
            superadmin_password: "admin1234".to_string(),
        }
    }
}

/// Google OAuth 2.0 설정
///
/// # Environment Variables
///
/// * `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` - 비어 있으면 Google 로그인은 503
/// * `GOOGLE_REDIRECT_URL` - 콜백 주소 (기본값: `http://localhost:8000/auth/google/callback`)
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub userinfo_uri: String,
}

impl GoogleOAuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            redirect_url: env::var("GOOGLE_REDIRECT_URL").unwrap_or(defaults.redirect_url),
            auth_uri: env::var("GOOGLE_AUTH_URI").unwrap_or(defaults.auth_uri),
            token_uri: env::var("GOOGLE_TOKEN_URI").unwrap_or(defaults.token_uri),
            userinfo_uri: env::var("GOOGLE_USERINFO_URI").unwrap_or(defaults.userinfo_uri),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

impl Default for GoogleOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: "http://localhost:8000/auth/google/callback".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_uri: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}
