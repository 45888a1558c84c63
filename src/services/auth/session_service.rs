//! # 세션 관리자
//!
//! 토큰 코덱, 폐기 레지스트리, 리프레시 토큰 저장소를 조합하는 인증 흐름의
//! 합성 지점입니다.
//!
//! ```text
//! Anonymous ──login──▶ Authenticated(access, refresh)
//!     ▲                    │        │
//!     │   만료 / logout     │        └─refresh─▶ Authenticated'(access', refresh')
//!     └────────────────────┘
//! ```
//!
//! 외부 공급자 로그인([`SessionManager::oauth_login`])은 같은 이메일의 계정을
//! 찾거나 인증 완료 상태로 새로 만든 뒤, 비밀번호 로그인과 같은 방식으로
//! 세션을 발급합니다.
//!
//! 모든 연산은 여러 요청에서 동시에 호출해도 안전하며, 저장소 호출을 넘어
//! 잠금을 잡고 있지 않습니다. 리프레시 토큰 소비의 원자성은 저장소의
//! 조건부 삭제가 보장합니다.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use log::{info, warn};
use mongodb::bson::DateTime as BsonDateTime;
use validator::ValidateEmail;

use crate::config::{AccountConfig, AppConfig};
use crate::domain::entities::users::User;
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::oauth::OAuthUserInfo;
use crate::domain::models::token::TokenPair;
use crate::errors::{AppError, AppResult};
use crate::repositories::users::UserRepository;
use crate::services::auth::oauth_service::OAuthProvider;
use crate::services::auth::refresh_token_service::RefreshTokenService;
use crate::services::auth::revocation_service::RevocationRegistry;
use crate::services::auth::token_service::{extract_bearer_token, TokenCodec, TokenError};
use crate::utils::crypto_utils::{generate_secure_token, hash_password, verify_password, TOKEN_BYTES};
use crate::services::users::user_service::allocate_username;
use crate::utils::deadline::with_deadline;
use crate::utils::string_utils::normalize_email;
use crate::utils::time_utils::bson_after;

pub const PASSWORD_RESET_MESSAGE: &str =
    "If your email is registered, you will receive a password reset link";

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// 동의 화면에서 돌아오기까지 허용하는 시간 (분)
const OAUTH_STATE_MINUTES: i64 = 10;

pub struct SessionManager {
    users: Arc<dyn UserRepository>,
    codec: Arc<TokenCodec>,
    refresh_tokens: Arc<RefreshTokenService>,
    revocations: Arc<dyn RevocationRegistry>,
    account: AccountConfig,
    bcrypt_cost: u32,
    timeout: StdDuration,
    /// 존재하지 않는 이메일에도 같은 bcrypt 비용을 치르기 위한 해시
    dummy_hash: String,
}

impl SessionManager {
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        codec: Arc<TokenCodec>,
        refresh_tokens: Arc<RefreshTokenService>,
        revocations: Arc<dyn RevocationRegistry>,
    ) -> Self {
        let dummy_hash = bcrypt::hash(generate_secure_token(16), config.password.bcrypt_cost)
            .unwrap_or_else(|e| {
                warn!("⚠️ 타이밍 보정용 해시 생성 실패: {}", e);
                String::new()
            });

        Self {
            users,
            codec,
            refresh_tokens,
            revocations,
            account: config.account.clone(),
            bcrypt_cost: config.password.bcrypt_cost,
            timeout: config.database.timeout,
            dummy_hash,
        }
    }

    /// 이메일/비밀번호 로그인. 실패 원인(미등록/불일치)은 구분하지 않습니다.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
        let email = normalize_email(email);
        let user = with_deadline(self.timeout, "users.find_by_email", self.users.find_by_email(&email)).await?;

        let Some(user) = user else {
            let _ = verify_password(password, &self.dummy_hash).await;
            warn!("로그인 실패: 자격 증명 불일치");
            return Err(AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(password, &user.password_hash).await? {
            warn!("로그인 실패: 자격 증명 불일치");
            return Err(AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
        }

        let tokens = self.issue_session(&user).await?;
        info!("🔓 로그인 성공: {}", user.id_string().unwrap_or_default());
        Ok((user, tokens))
    }

    pub fn issue_access_token(&self, user: &User) -> AppResult<String> {
        let user_id = user
            .id_string()
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;
        Ok(self.codec.issue_access_token(&user_id, user.role)?)
    }

    async fn issue_session(&self, user: &User) -> AppResult<TokenPair> {
        let access_token = self.issue_access_token(user)?;
        let user_id = user
            .id_string()
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;
        let refresh = self.refresh_tokens.issue(&user_id).await?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.token,
        })
    }

    /// 공급자 동의 화면 URL을 만듭니다. `state`는 서명된 단기 토큰입니다.
    pub fn begin_oauth(&self, provider: &dyn OAuthProvider) -> AppResult<String> {
        let state = self
            .codec
            .issue_oauth_state(chrono::Duration::minutes(OAUTH_STATE_MINUTES))?;
        provider.authorization_url(&state)
    }

    /// 콜백 처리: `state` 확인, 코드 교환, 계정 찾기/생성, 세션 발급
    pub async fn complete_oauth(
        &self,
        provider: &dyn OAuthProvider,
        code: &str,
        state: &str,
    ) -> AppResult<(User, TokenPair)> {
        if self.codec.verify_oauth_state(state).is_err() {
            warn!("OAuth 콜백 거부: state 불일치 ({})", provider.name());
            return Err(AppError::AuthenticationError("Invalid OAuth state".to_string()));
        }

        let info = provider.fetch_user(code).await?;
        self.oauth_login(info).await
    }

    /// 공급자가 확인한 이메일로 로그인합니다. 계정이 없으면 인증 완료 상태로 만듭니다.
    pub async fn oauth_login(&self, info: OAuthUserInfo) -> AppResult<(User, TokenPair)> {
        if !info.email_verified {
            warn!("OAuth 로그인 거부: 미인증 이메일 ({})", info.provider);
            return Err(AppError::AuthenticationError(
                "Email is not verified by the identity provider".to_string(),
            ));
        }

        let email = normalize_email(&info.email);
        if !email.validate_email() {
            return Err(AppError::ExternalServiceError(format!(
                "{} 공급자가 잘못된 이메일을 반환했습니다",
                info.provider
            )));
        }

        let existing = with_deadline(self.timeout, "users.find_by_email", self.users.find_by_email(&email)).await?;
        let user = match existing {
            Some(user) => user,
            None => self.create_oauth_user(&info, email).await?,
        };

        let tokens = self.issue_session(&user).await?;
        info!(
            "🔓 OAuth 로그인 성공: {} ({})",
            user.id_string().unwrap_or_default(),
            info.provider
        );
        Ok((user, tokens))
    }

    async fn create_oauth_user(&self, info: &OAuthUserInfo, email: String) -> AppResult<User> {
        let name = match info.name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            name => name.to_string(),
        };
        let username = allocate_username(self.users.as_ref(), self.timeout, &name).await?;
        let user = User::new_oauth(email.clone(), username, name);

        match with_deadline(self.timeout, "users.create", self.users.create(user)).await {
            Ok(user) => {
                info!("👤 OAuth 회원가입: {} ({})", user.username, info.provider);
                Ok(user)
            }
            // 같은 이메일로 동시에 들어온 콜백이 먼저 만든 계정을 사용
            Err(AppError::ConflictError(msg)) => {
                with_deadline(self.timeout, "users.find_by_email", self.users.find_by_email(&email))
                    .await?
                    .ok_or(AppError::ConflictError(msg))
            }
            Err(err) => Err(err),
        }
    }

    /// `Authorization` 헤더 값으로 요청 주체를 확인합니다.
    ///
    /// 헤더 누락/형식 오류, 폐기된 토큰, 무효/만료 토큰은 모두 401입니다.
    pub async fn authenticate_request(&self, authorization: Option<&str>) -> AppResult<AuthenticatedUser> {
        let token = authorization
            .and_then(extract_bearer_token)
            .ok_or_else(|| AppError::AuthenticationError("Missing or malformed Authorization header".to_string()))?;

        let revoked = with_deadline(self.timeout, "revocations.is_revoked", self.revocations.is_revoked(token)).await?;
        if revoked {
            return Err(AppError::AuthenticationError("Token has been revoked".to_string()));
        }

        let claims = self.codec.verify(token)?;
        Ok(AuthenticatedUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }

    /// 리프레시 토큰을 소비하고 새 액세스/리프레시 토큰 쌍을 발급합니다.
    ///
    /// 소비가 성공하면 이후 단계가 실패해도 이전 토큰은 다시 쓸 수 없습니다.
    pub async fn refresh(&self, raw_refresh_token: &str) -> AppResult<TokenPair> {
        let user_id = self.refresh_tokens.consume(raw_refresh_token).await?;

        let user = with_deadline(self.timeout, "users.find_by_id", self.users.find_by_id(&user_id))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.issue_session(&user).await
    }

    /// 액세스 토큰을 자연 만료 시각까지 폐기합니다.
    ///
    /// 헤더 형식 오류나 서명이 맞지 않는 토큰은 400입니다.
    /// 이미 만료된 토큰은 기록 없이 성공으로 처리합니다.
    pub async fn logout(&self, authorization: Option<&str>) -> AppResult<()> {
        let token = authorization
            .and_then(extract_bearer_token)
            .ok_or_else(|| AppError::ValidationError("Missing or malformed Authorization header".to_string()))?;

        let expires_at = self.codec.decode_expiry(token).map_err(|err| match err {
            TokenError::Signing(msg) => AppError::InternalError(msg),
            _ => AppError::ValidationError("Invalid token".to_string()),
        })?;

        with_deadline(
            self.timeout,
            "revocations.revoke",
            self.revocations.revoke(token, expires_at),
        )
        .await?;
        info!("🔒 로그아웃: 토큰 폐기 (만료 {})", expires_at);
        Ok(())
    }

    /// 등록 여부와 관계없이 같은 메시지를 반환합니다.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<&'static str> {
        let email = normalize_email(email);
        let user = with_deadline(self.timeout, "users.find_by_email", self.users.find_by_email(&email)).await?;

        if let Some(user) = user {
            let user_id = user
                .id_string()
                .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;
            let token = generate_secure_token(TOKEN_BYTES);
            with_deadline(
                self.timeout,
                "users.store_reset_token",
                self.users
                    .store_reset_token(&user_id, &token, bson_after(self.account.reset_token_ttl())),
            )
            .await?;

            // 메일 발송 대신 링크를 로그로 남김
            info!("📧 비밀번호 재설정 링크: {}", self.account.reset_link(&token));
        }

        Ok(PASSWORD_RESET_MESSAGE)
    }

    /// 재설정 토큰으로 비밀번호를 교체합니다.
    ///
    /// 토큰 소비와 비밀번호 교체는 저장소의 단일 조건부 연산이므로
    /// 같은 토큰으로 동시에 요청해도 하나만 성공합니다.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        let invalid = || AppError::AuthenticationError("Invalid or expired reset token".to_string());

        // 해싱 비용을 치르기 전에 명백히 무효한 토큰을 걸러냄
        let candidate = with_deadline(
            self.timeout,
            "users.find_by_reset_token",
            self.users.find_by_reset_token(token),
        )
        .await?
        .ok_or_else(invalid)?;
        if !candidate.has_valid_reset_token(token, BsonDateTime::now()) {
            return Err(invalid());
        }

        let new_hash = hash_password(new_password, self.bcrypt_cost).await?;
        let user = with_deadline(
            self.timeout,
            "users.consume_reset_token",
            self.users
                .consume_reset_token(token, &new_hash, BsonDateTime::now()),
        )
        .await?
        .ok_or_else(invalid)?;

        if let Some(user_id) = user.id_string() {
            let revoked = self.refresh_tokens.revoke_all(&user_id).await?;
            info!("🔑 비밀번호 재설정 완료: {} (리프레시 토큰 {}건 폐기)", user_id, revoked);
        }
        Ok(())
    }

    pub async fn verify_email(&self, token: &str) -> AppResult<User> {
        let user = with_deadline(
            self.timeout,
            "users.consume_verification_token",
            self.users
                .consume_verification_token(token, BsonDateTime::now()),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid verification token".to_string()))?;

        info!("✅ 이메일 인증 완료: {}", user.id_string().unwrap_or_default());
        Ok(user)
    }
}
