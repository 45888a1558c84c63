//! 프로세스 메모리 기반 사용자 저장소
//!
//! `STORAGE_BACKEND=memory` 로컬 실행과 테스트에서 사용합니다.
//! 유일성 검사와 삽입, 조건 확인과 필드 갱신이 같은 쓰기 잠금 안에서 이루어집니다.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};

use super::user_repo::UserRepository;
use crate::domain::entities::users::{Role, User};
use crate::errors::{AppError, AppResult};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<ObjectId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_where<P>(&self, predicate: P) -> AppResult<Option<User>>
    where
        P: Fn(&User) -> bool,
    {
        let users = self
            .users
            .read()
            .map_err(|_| AppError::InternalError("user store lock poisoned".to_string()))?;
        Ok(users
            .values()
            .find(|user| !user.is_deleted() && predicate(user))
            .cloned())
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, HashMap<ObjectId, User>>> {
        self.users
            .write()
            .map_err(|_| AppError::InternalError("user store lock poisoned".to_string()))
    }

    fn check_unique(users: &HashMap<ObjectId, User>, candidate: &User) -> AppResult<()> {
        for existing in users.values() {
            if existing.id == candidate.id {
                continue;
            }
            if existing.email == candidate.email {
                return Err(AppError::ConflictError("Email already exists".to_string()));
            }
            if existing.username == candidate.username {
                return Err(AppError::ConflictError("Username already taken".to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        self.find_where(|user| user.id == Some(object_id))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_where(|user| user.email == email)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.find_where(|user| user.username == username)
    }

    async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>> {
        self.find_where(|user| user.reset_token.as_deref() == Some(token))
    }

    async fn exists_with_role(&self, role: Role) -> AppResult<bool> {
        let users = self
            .users
            .read()
            .map_err(|_| AppError::InternalError("user store lock poisoned".to_string()))?;
        Ok(users.values().any(|user| user.role == role))
    }

    async fn create(&self, mut user: User) -> AppResult<User> {
        let mut users = self.write()?;

        let id = ObjectId::new();
        user.id = Some(id);
        Self::check_unique(&users, &user)?;
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        username: Option<&str>,
    ) -> AppResult<Option<User>> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let mut users = self.write()?;

        if let Some(username) = username {
            let taken = users
                .values()
                .any(|other| other.id != Some(object_id) && other.username == username);
            if taken {
                return Err(AppError::ConflictError("Username already taken".to_string()));
            }
        }

        let Some(user) = users.get_mut(&object_id).filter(|user| !user.is_deleted()) else {
            return Ok(None);
        };
        if let Some(name) = name {
            user.name = name.to_string();
        }
        if let Some(username) = username {
            user.username = username.to_string();
        }
        user.touch();
        Ok(Some(user.clone()))
    }

    async fn replace_password_hash(&self, id: &str, current_hash: &str, new_hash: &str) -> AppResult<bool> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let mut users = self.write()?;

        match users.get_mut(&object_id) {
            Some(user) if !user.is_deleted() && user.password_hash == current_hash => {
                user.replace_password(new_hash.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn store_reset_token(&self, id: &str, token: &str, expires_at: DateTime) -> AppResult<()> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::NotFound("User not found".to_string()))?;
        let mut users = self.write()?;

        let user = users
            .get_mut(&object_id)
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.set_reset_token(token.to_string(), expires_at);
        Ok(())
    }

    async fn consume_reset_token(&self, token: &str, new_hash: &str, now: DateTime) -> AppResult<Option<User>> {
        let mut users = self.write()?;

        let Some(user) = users
            .values_mut()
            .find(|user| !user.is_deleted() && user.has_valid_reset_token(token, now))
        else {
            return Ok(None);
        };
        user.replace_password(new_hash.to_string());
        Ok(Some(user.clone()))
    }

    async fn consume_verification_token(&self, token: &str, now: DateTime) -> AppResult<Option<User>> {
        let mut users = self.write()?;

        let Some(user) = users
            .values_mut()
            .find(|user| !user.is_deleted() && user.verification_token.as_deref() == Some(token))
        else {
            return Ok(None);
        };
        user.mark_verified(now);
        Ok(Some(user.clone()))
    }
}
