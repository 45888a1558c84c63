//! # 리프레시 토큰 리포지토리
//!
//! `take`는 조회와 삭제를 한 번의 원자적 연산으로 수행합니다
//! (`findOneAndDelete`). 같은 토큰으로 동시에 들어온 요청 중 정확히
//! 하나만 레코드를 받습니다.

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use mongodb::bson::{doc, DateTime};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};

use crate::db::Database;
use crate::domain::entities::tokens::RefreshTokenRecord;
use crate::errors::AppResult;

pub const REFRESH_TOKENS_COLLECTION: &str = "refresh_tokens";

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn insert(&self, record: RefreshTokenRecord) -> AppResult<()>;

    /// 다이제스트가 일치하는 레코드를 삭제하며 반환합니다.
    async fn take(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>>;

    async fn delete_by_user(&self, user_id: &str) -> AppResult<u64>;

    async fn delete_expired(&self, now: DateTime) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct MongoRefreshTokenRepository {
    collection: Collection<RefreshTokenRecord>,
}

impl MongoRefreshTokenRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database
                .get_database()
                .collection::<RefreshTokenRecord>(REFRESH_TOKENS_COLLECTION),
        }
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        let token_index = IndexModel::builder()
            .keys(doc! { "token_hash": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("token_hash_unique".to_string())
                .build())
            .build();

        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(IndexOptions::builder()
                .name("user_id".to_string())
                .build())
            .build();

        // 만료 시각이 지나면 MongoDB가 백그라운드로 문서를 제거
        let ttl_index = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(IndexOptions::builder()
                .expire_after(Duration::from_secs(0))
                .name("expires_at_ttl".to_string())
                .build())
            .build();

        self.collection
            .create_indexes([token_index, user_index, ttl_index])
            .await?;

        info!("📇 refresh_tokens 인덱스 준비 완료");
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for MongoRefreshTokenRepository {
    async fn insert(&self, record: RefreshTokenRecord) -> AppResult<()> {
        self.collection.insert_one(&record).await?;
        Ok(())
    }

    async fn take(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        Ok(self
            .collection
            .find_one_and_delete(doc! { "token_hash": token_hash })
            .await?)
    }

    async fn delete_by_user(&self, user_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "user_id": user_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_expired(&self, now: DateTime) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "expires_at": { "$lte": now } })
            .await?;
        Ok(result.deleted_count)
    }
}
