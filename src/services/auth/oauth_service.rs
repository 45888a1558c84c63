//! # 외부 ID 공급자 (OAuth 2.0 Authorization Code)
//!
//! ```text
//! GET /auth/google ──307──▶ 공급자 동의 화면 (state 포함)
//!                                │
//! GET /auth/google/callback ◀────┘ ?code=...&state=...
//!     ├─ state 서명/만료 확인
//!     ├─ code → access_token 교환
//!     ├─ userinfo 조회
//!     └─ 계정 찾기/생성 후 세션 발급
//! ```
//!
//! 공급자 통신은 [`OAuthProvider`] 뒤에 두어 테스트에서 교체할 수 있습니다.

use std::time::Duration;

use async_trait::async_trait;
use log::{error, warn};
use serde::Deserialize;

use crate::config::GoogleOAuthConfig;
use crate::domain::models::oauth::OAuthUserInfo;
use crate::errors::{AppError, AppResult};

const GOOGLE_SCOPES: &str = "openid email profile";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// 동의 화면 URL. `state`는 콜백에서 그대로 돌아옵니다.
    fn authorization_url(&self, state: &str) -> AppResult<String>;

    /// 인가 코드를 교환하고 사용자 정보를 가져옵니다.
    async fn fetch_user(&self, code: &str) -> AppResult<OAuthUserInfo>;
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: String,
    #[serde(default)]
    verified_email: bool,
    #[serde(default)]
    name: Option<String>,
}

pub struct GoogleOAuthProvider {
    config: GoogleOAuthConfig,
    client: reqwest::Client,
}

impl GoogleOAuthProvider {
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("⚠️ HTTP 클라이언트 설정 실패, 기본 클라이언트 사용: {}", e);
                reqwest::Client::new()
            });

        Self {
            config: config.clone(),
            client,
        }
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(AppError::ServiceUnavailable("Google sign-in is not configured".to_string()))
        }
    }

    async fn exchange_code(&self, code: &str) -> AppResult<GoogleTokenResponse> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(&self.config.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 토큰 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Google 토큰 교환 실패: {} {}", status, body);
            return Err(AppError::ExternalServiceError(format!("Google 토큰 교환 실패: {}", status)));
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 토큰 응답 파싱 실패: {}", e)))
    }

    async fn user_info(&self, access_token: &str) -> AppResult<GoogleUserInfo> {
        let response = self
            .client
            .get(&self.config.userinfo_uri)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 사용자 정보 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalServiceError(format!("Google 사용자 정보 조회 실패: {}", status)));
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 사용자 정보 파싱 실패: {}", e)))
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> AppResult<String> {
        self.ensure_configured()?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&state={}",
            self.config.auth_uri,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode(GOOGLE_SCOPES),
            urlencoding::encode(state),
        ))
    }

    async fn fetch_user(&self, code: &str) -> AppResult<OAuthUserInfo> {
        self.ensure_configured()?;

        let token = self.exchange_code(code).await?;
        let info = self.user_info(&token.access_token).await?;

        Ok(OAuthUserInfo {
            provider: self.name().to_string(),
            subject: info.id,
            name: info.name.unwrap_or_default(),
            email: info.email,
            email_verified: info.verified_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            redirect_url: "http://localhost:8000/auth/google/callback".to_string(),
            ..GoogleOAuthConfig::default()
        }
    }

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let provider = GoogleOAuthProvider::new(&configured());

        let url = provider.authorization_url("abc.def.ghi").unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.ends_with("state=abc.def.ghi"));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_unavailable() {
        let provider = GoogleOAuthProvider::new(&GoogleOAuthConfig::default());

        assert!(matches!(
            provider.authorization_url("state"),
            Err(AppError::ServiceUnavailable(_))
        ));
        assert!(matches!(
            provider.fetch_user("code").await,
            Err(AppError::ServiceUnavailable(_))
        ));
    }
}
