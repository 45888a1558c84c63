//! 프로세스 메모리 기반 리프레시 토큰 저장소

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::DateTime;

use super::refresh_token_repo::RefreshTokenRepository;
use crate::domain::entities::tokens::RefreshTokenRecord;
use crate::errors::{AppError, AppResult};

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    records: Mutex<HashMap<String, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, RefreshTokenRecord>>> {
        self.records
            .lock()
            .map_err(|_| AppError::InternalError("refresh token store lock poisoned".to_string()))
    }

    pub fn count(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn insert(&self, record: RefreshTokenRecord) -> AppResult<()> {
        let mut records = self.lock()?;
        if records.contains_key(&record.token_hash) {
            return Err(AppError::ConflictError("Refresh token already exists".to_string()));
        }
        records.insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn take(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        Ok(self.lock()?.remove(token_hash))
    }

    async fn delete_by_user(&self, user_id: &str) -> AppResult<u64> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, record| record.user_id != user_id);
        Ok((before - records.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime) -> AppResult<u64> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        Ok((before - records.len()) as u64)
    }
}
