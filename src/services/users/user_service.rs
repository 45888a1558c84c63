//! 사용자 계정 서비스
//!
//! 회원가입, 프로필 조회/수정, 비밀번호 변경, 최고 관리자 시드를 담당합니다.
//! 이메일/사용자명 유일성은 사전 조회로 친절한 409를 주고,
//! 동시 요청 경합은 저장소의 유니크 제약이 최종적으로 막습니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::{AccountConfig, AppConfig};
use crate::domain::dto::users::request::{ChangePasswordRequest, RegisterRequest, UpdateProfileRequest};
use crate::domain::entities::users::{Role, User};
use crate::errors::{AppError, AppResult};
use crate::repositories::users::UserRepository;
use crate::services::auth::refresh_token_service::RefreshTokenService;
use crate::utils::crypto_utils::{
    generate_secure_token, generate_username, hash_password, verify_password, TOKEN_BYTES,
};
use crate::utils::deadline::with_deadline;
use crate::utils::string_utils::{normalize_email, validate_required_string};

const USERNAME_ATTEMPTS: usize = 5;

/// 이름 기반 사용자명 후보 중 비어 있는 것을 고릅니다.
///
/// 회원가입과 OAuth 최초 로그인이 함께 씁니다. 확인과 생성 사이의 경합은
/// 저장소의 고유 인덱스가 409로 막습니다.
pub(crate) async fn allocate_username(
    users: &dyn UserRepository,
    timeout: Duration,
    name: &str,
) -> AppResult<String> {
    for _ in 0..USERNAME_ATTEMPTS {
        let candidate = generate_username(name);
        let taken = with_deadline(timeout, "users.find_by_username", users.find_by_username(&candidate)).await?;
        if taken.is_none() {
            return Ok(candidate);
        }
    }
    warn!("사용자명 생성 실패: {}회 모두 중복", USERNAME_ATTEMPTS);
    Err(AppError::ConflictError("Could not allocate a unique username".to_string()))
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<RefreshTokenService>,
    account: AccountConfig,
    bcrypt_cost: u32,
    timeout: Duration,
}

impl UserService {
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<RefreshTokenService>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            account: config.account.clone(),
            bcrypt_cost: config.password.bcrypt_cost,
            timeout: config.database.timeout,
        }
    }

    /// 새 로컬 사용자를 등록합니다.
    ///
    /// 사용자명은 이름에서 자동 생성되며, 미인증 상태로 인증 토큰을 발급해
    /// 인증 링크를 로그로 남깁니다.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        let started = Instant::now();
        let email = normalize_email(&request.email);
        let name = validate_required_string(&request.name, "이름")?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::ConflictError("Email already exists".to_string()));
        }

        let username = allocate_username(self.users.as_ref(), self.timeout, &name).await?;
        let password_hash = hash_password(&request.password, self.bcrypt_cost).await?;

        let verification_token = generate_secure_token(TOKEN_BYTES);
        let mut user = User::new_local(email, username, name, password_hash);
        user.verification_token = Some(verification_token.clone());

        let user = with_deadline(self.timeout, "users.create", self.users.create(user)).await?;

        info!(
            "👤 회원가입 완료: {} ({}) - {:?}",
            user.username,
            user.id_string().unwrap_or_default(),
            started.elapsed()
        );
        info!("📧 이메일 인증 링크: {}", self.account.verification_link(&verification_token));
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        with_deadline(self.timeout, "users.find_by_email", self.users.find_by_email(email)).await
    }

    pub async fn get_profile(&self, user_id: &str) -> AppResult<User> {
        with_deadline(self.timeout, "users.find_by_id", self.users.find_by_id(user_id))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// 이름/사용자명을 수정합니다. 비어 있는 필드는 그대로 둡니다.
    ///
    /// 지정한 필드만 저장소에 반영하므로 동시에 진행 중인 비밀번호 변경을 덮어쓰지 않습니다.
    pub async fn update_profile(&self, user_id: &str, request: UpdateProfileRequest) -> AppResult<User> {
        let current = self.get_profile(user_id).await?;

        let username = request
            .username
            .filter(|username| *username != current.username);
        if let Some(username) = username.as_deref() {
            let taken = with_deadline(
                self.timeout,
                "users.find_by_username",
                self.users.find_by_username(username),
            )
            .await?;
            if taken.is_some() {
                return Err(AppError::ConflictError("Username already taken".to_string()));
            }
        }

        with_deadline(
            self.timeout,
            "users.update_profile",
            self.users
                .update_profile(user_id, request.name.as_deref(), username.as_deref()),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// 현재 비밀번호 확인 후 변경하고, 기존 리프레시 토큰을 모두 폐기합니다.
    ///
    /// 확인한 해시가 그 사이 바뀌었다면 변경하지 않고 401로 응답합니다.
    pub async fn change_password(&self, user_id: &str, request: ChangePasswordRequest) -> AppResult<()> {
        let user = self.get_profile(user_id).await?;
        let incorrect = || AppError::AuthenticationError("Current password is incorrect".to_string());

        if !verify_password(&request.current_password, &user.password_hash).await? {
            return Err(incorrect());
        }

        let new_hash = hash_password(&request.new_password, self.bcrypt_cost).await?;
        let replaced = with_deadline(
            self.timeout,
            "users.replace_password_hash",
            self.users
                .replace_password_hash(user_id, &user.password_hash, &new_hash),
        )
        .await?;
        if !replaced {
            warn!("비밀번호 변경 경합: {} (다른 요청이 먼저 변경)", user_id);
            return Err(incorrect());
        }

        let revoked = self.refresh_tokens.revoke_all(user_id).await?;
        info!("🔑 비밀번호 변경 완료: {} (리프레시 토큰 {}건 폐기)", user_id, revoked);
        Ok(())
    }

    /// 최고 관리자가 없으면 설정값으로 생성합니다. 생성했으면 `true`.
    pub async fn seed_super_admin(&self) -> AppResult<bool> {
        let exists = with_deadline(
            self.timeout,
            "users.exists_with_role",
            self.users.exists_with_role(Role::SuperAdmin),
        )
        .await?;
        if exists {
            info!("🌱 최고 관리자 계정이 이미 존재합니다");
            return Ok(false);
        }

        let password_hash = hash_password(&self.account.superadmin_password, self.bcrypt_cost).await?;
        let mut admin = User::new_local(
            normalize_email(&self.account.superadmin_email),
            "superadmin".to_string(),
            "Super Admin".to_string(),
            password_hash,
        );
        admin.role = Role::SuperAdmin;
        admin.mark_verified(mongodb::bson::DateTime::now());

        let admin = with_deadline(self.timeout, "users.create", self.users.create(admin)).await?;
        info!("🌱 최고 관리자 시드 완료: {}", admin.email);
        Ok(true)
    }
}
