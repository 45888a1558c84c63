//! # 사용자 리포지토리 구현
//!
//! 사용자 엔티티의 데이터 액세스 계층입니다.
//! [`UserRepository`] trait이 서비스 계층과의 경계이며,
//! MongoDB 구현과 메모리 구현([`super::memory`])이 있습니다.
//!
//! 모든 조회/갱신은 소프트 삭제되지 않은 사용자만 대상으로 합니다.
//! 이메일/사용자명 유일성은 유니크 인덱스가 최종적으로 보장하며,
//! 위반은 `ConflictError`로 변환됩니다.
//!
//! 갱신은 문서 전체를 교체하지 않고 연산마다 필요한 필드만 `$set`/`$unset`합니다.
//! 일회성 토큰 소비와 비밀번호 교체는 조건부 단일 연산이라 동시 요청 중 하나만 성공합니다.

use async_trait::async_trait;
use log::info;
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel};

use crate::db::Database;
use crate::domain::entities::users::{Role, User};
use crate::errors::{AppError, AppResult};

pub const USERS_COLLECTION: &str = "users";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ObjectId 형식이 아니면 `Ok(None)`
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// 토큰 값만 일치하면 반환합니다. 만료 판정은 호출자 몫입니다.
    async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>>;

    async fn exists_with_role(&self, role: Role) -> AppResult<bool>;

    /// 새 사용자를 저장하고 ID가 채워진 사용자를 반환합니다.
    async fn create(&self, user: User) -> AppResult<User>;

    /// 이름/사용자명만 갱신하고 갱신된 사용자를 반환합니다. 사용자가 없으면 `None`.
    async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        username: Option<&str>,
    ) -> AppResult<Option<User>>;

    /// 저장된 해시가 `current_hash`일 때만 교체하고 재설정 토큰을 지웁니다.
    /// 교체했으면 `true`.
    async fn replace_password_hash(&self, id: &str, current_hash: &str, new_hash: &str) -> AppResult<bool>;

    async fn store_reset_token(&self, id: &str, token: &str, expires_at: DateTime) -> AppResult<()>;

    /// `now` 시점에 유효한 재설정 토큰을 소비하면서 비밀번호를 교체합니다.
    /// 같은 토큰으로는 한 번만 성공합니다.
    async fn consume_reset_token(&self, token: &str, new_hash: &str, now: DateTime) -> AppResult<Option<User>>;

    /// 인증 토큰을 소비하고 인증 완료 상태로 표시합니다. 한 번만 성공합니다.
    async fn consume_verification_token(&self, token: &str, now: DateTime) -> AppResult<Option<User>>;
}

/// 소프트 삭제되지 않은 문서만 대상으로 하도록 필터를 보강합니다.
fn active(mut filter: Document) -> Document {
    filter.insert("deleted_at", Bson::Null);
    filter
}

/// 비밀번호 해시 교체 + 남은 재설정 토큰 제거
fn password_update(new_hash: &str) -> Document {
    doc! {
        "$set": { "password_hash": new_hash, "updated_at": DateTime::now() },
        "$unset": { "reset_token": "", "reset_expires_at": "" },
    }
}

/// MongoDB `users` 컬렉션 리포지토리
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.get_database().collection::<User>(USERS_COLLECTION),
        }
    }

    async fn find_active(&self, filter: Document) -> AppResult<Option<User>> {
        Ok(self.collection.find_one(active(filter)).await?)
    }

    /// 유니크/조회용 인덱스를 생성합니다. 기동 시 한 번 호출됩니다.
    pub async fn create_indexes(&self) -> AppResult<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
                .build())
            .build();

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("username_unique".to_string())
                .build())
            .build();

        let verification_index = IndexModel::builder()
            .keys(doc! { "verification_token": 1 })
            .options(IndexOptions::builder()
                .sparse(true)
                .name("verification_token".to_string())
                .build())
            .build();

        let reset_index = IndexModel::builder()
            .keys(doc! { "reset_token": 1 })
            .options(IndexOptions::builder()
                .sparse(true)
                .name("reset_token".to_string())
                .build())
            .build();

        self.collection
            .create_indexes([email_index, username_index, verification_index, reset_index])
            .await?;

        info!("📇 users 인덱스 준비 완료");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        self.find_active(doc! { "_id": object_id }).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_active(doc! { "email": email }).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.find_active(doc! { "username": username }).await
    }

    async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>> {
        self.find_active(doc! { "reset_token": token }).await
    }

    async fn exists_with_role(&self, role: Role) -> AppResult<bool> {
        let found = self
            .collection
            .find_one(doc! { "role": role.as_str() })
            .await?;
        Ok(found.is_some())
    }

    async fn create(&self, mut user: User) -> AppResult<User> {
        let result = self.collection.insert_one(&user).await?;
        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError("삽입된 문서의 ID가 ObjectId가 아닙니다".to_string())
        })?;
        user.id = Some(id);
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

        let mut set = doc! { "updated_at": DateTime::now() };
        if let Some(name) = name {
            set.insert("name", name);
        }
        if let Some(username) = username {
            set.insert("username", username);
        }

        Ok(self
            .collection
            .find_one_and_update(active(doc! { "_id": object_id }), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn replace_password_hash(&self, id: &str, current_hash: &str, new_hash: &str) -> AppResult<bool> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(false);
        };

        let result = self
            .collection
            .update_one(
                active(doc! { "_id": object_id, "password_hash": current_hash }),
                password_update(new_hash),
            )
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn store_reset_token(&self, id: &str, token: &str, expires_at: DateTime) -> AppResult<()> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Err(AppError::NotFound("User not found".to_string()));
        };

        let result = self
            .collection
            .update_one(
                active(doc! { "_id": object_id }),
                doc! { "$set": {
                    "reset_token": token,
                    "reset_expires_at": expires_at,
                    "updated_at": DateTime::now(),
                } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn consume_reset_token(&self, token: &str, new_hash: &str, now: DateTime) -> AppResult<Option<User>> {
        Ok(self
            .collection
            .find_one_and_update(
                active(doc! { "reset_token": token, "reset_expires_at": { "$gt": now } }),
                password_update(new_hash),
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn consume_verification_token(&self, token: &str, now: DateTime) -> AppResult<Option<User>> {
        Ok(self
            .collection
            .find_one_and_update(
                active(doc! { "verification_token": token }),
                doc! {
                    "$set": { "is_verified": true, "email_verified_at": now, "updated_at": now },
                    "$unset": { "verification_token": "" },
                },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }
}
