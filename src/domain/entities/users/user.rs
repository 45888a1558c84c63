//! User Entity Implementation
//!
//! 사용자 엔티티입니다. 이메일/사용자명은 전역 유일하며,
//! 인증 상태와 일회성 인증/재설정 토큰을 함께 보관합니다.
//! 하드 삭제하지 않고 `deleted_at`으로 소프트 삭제를 표시합니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub username: String,
    pub name: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_expires_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime>,
}

impl User {
    /// 회원가입으로 생성되는 일반 사용자 (미인증 상태)
    pub fn new_local(email: String, username: String, name: String, password_hash: String) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            email,
            username,
            name,
            password_hash,
            role: Role::User,
            is_verified: false,
            email_verified_at: None,
            verification_token: None,
            reset_token: None,
            reset_expires_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// 외부 공급자 로그인으로 생성되는 사용자
    ///
    /// 공급자가 이메일을 확인했으므로 인증 완료 상태로 시작합니다. 비밀번호
    /// 해시는 비어 있어 비밀번호 로그인은 재설정 전까지 항상 실패합니다.
    pub fn new_oauth(email: String, username: String, name: String) -> Self {
        let mut user = Self::new_local(email, username, name, String::new());
        user.mark_verified(user.created_at);
        user
    }

    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn touch(&mut self) {
        self.updated_at = DateTime::now();
    }

    /// 이메일 인증 완료 처리
    pub fn mark_verified(&mut self, now: DateTime) {
        self.is_verified = true;
        self.email_verified_at = Some(now);
        self.verification_token = None;
        self.updated_at = now;
    }

    /// 재설정 토큰이 `now` 시점에 유효한지 확인합니다.
    pub fn has_valid_reset_token(&self, token: &str, now: DateTime) -> bool {
        match (&self.reset_token, self.reset_expires_at) {
            (Some(stored), Some(expires_at)) => stored == token && now < expires_at,
            _ => false,
        }
    }

    pub fn set_reset_token(&mut self, token: String, expires_at: DateTime) {
        self.reset_token = Some(token);
        self.reset_expires_at = Some(expires_at);
        self.touch();
    }

    /// 비밀번호 해시를 교체하고 남아있는 재설정 토큰을 지웁니다.
    pub fn replace_password(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.reset_token = None;
        self.reset_expires_at = None;
        self.touch();
    }
}
