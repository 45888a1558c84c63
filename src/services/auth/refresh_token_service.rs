//! # 리프레시 토큰 저장소 서비스
//!
//! 불투명한 일회용 리프레시 토큰의 발급/소비/폐기를 담당합니다.
//!
//! - 발급: 256비트 난수 토큰을 만들고 다이제스트만 저장
//! - 소비: 레코드를 원자적으로 꺼내며 삭제. 두 번째 소비는 `NotFound`
//! - 만료: 꺼낸 레코드가 만료됐으면 `Expired` (레코드는 이미 삭제됨)

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use mongodb::bson::DateTime as BsonDateTime;
use thiserror::Error;

use crate::domain::entities::tokens::RefreshTokenRecord;
use crate::errors::{AppError, AppResult};
use crate::repositories::tokens::RefreshTokenRepository;
use crate::utils::crypto_utils::{generate_secure_token, hash_token, TOKEN_BYTES};
use crate::utils::deadline::with_deadline;
use crate::utils::time_utils::{from_chrono, to_chrono};

#[derive(Debug, Error)]
pub enum RefreshTokenError {
    #[error("refresh token not found")]
    NotFound,

    #[error("refresh token expired")]
    Expired,

    #[error(transparent)]
    Storage(#[from] AppError),
}

impl From<RefreshTokenError> for AppError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::NotFound | RefreshTokenError::Expired => {
                AppError::AuthenticationError("Invalid or expired refresh token".to_string())
            }
            RefreshTokenError::Storage(inner) => inner,
        }
    }
}

/// 새로 발급된 리프레시 토큰 (원문은 이 값에만 존재)
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct RefreshTokenService {
    repository: Arc<dyn RefreshTokenRepository>,
    ttl: Duration,
    timeout: StdDuration,
}

impl RefreshTokenService {
    pub fn new(repository: Arc<dyn RefreshTokenRepository>, ttl: Duration, timeout: StdDuration) -> Self {
        Self {
            repository,
            ttl,
            timeout,
        }
    }

    pub async fn issue(&self, user_id: &str) -> AppResult<IssuedRefreshToken> {
        let token = generate_secure_token(TOKEN_BYTES);
        let expires_at = Utc::now() + self.ttl;
        let record = RefreshTokenRecord::new(hash_token(&token), user_id.to_string(), from_chrono(expires_at));

        with_deadline(self.timeout, "refresh_tokens.insert", self.repository.insert(record)).await?;

        Ok(IssuedRefreshToken { token, expires_at })
    }

    /// 토큰을 소비하고 소유자 ID를 반환합니다.
    pub async fn consume(&self, token: &str) -> Result<String, RefreshTokenError> {
        let record = with_deadline(
            self.timeout,
            "refresh_tokens.take",
            self.repository.take(&hash_token(token)),
        )
        .await?
        .ok_or(RefreshTokenError::NotFound)?;

        if record.is_expired_at(BsonDateTime::now()) {
            debug!(
                "만료된 리프레시 토큰 사용 시도: user {} (만료 {})",
                record.user_id,
                to_chrono(record.expires_at)
            );
            return Err(RefreshTokenError::Expired);
        }

        Ok(record.user_id)
    }

    /// 사용자의 모든 리프레시 토큰을 폐기합니다.
    pub async fn revoke_all(&self, user_id: &str) -> AppResult<u64> {
        with_deadline(
            self.timeout,
            "refresh_tokens.delete_by_user",
            self.repository.delete_by_user(user_id),
        )
        .await
    }

    pub async fn purge_expired(&self) -> AppResult<u64> {
        with_deadline(
            self.timeout,
            "refresh_tokens.delete_expired",
            self.repository.delete_expired(BsonDateTime::now()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::tokens::InMemoryRefreshTokenRepository;

    fn service_with(repo: Arc<InMemoryRefreshTokenRepository>) -> RefreshTokenService {
        RefreshTokenService::new(repo, Duration::days(7), StdDuration::from_secs(1))
    }

    #[tokio::test]
    async fn test_issue_then_consume_once() {
        let service = service_with(Arc::new(InMemoryRefreshTokenRepository::new()));
        let issued = service.issue("user-1").await.unwrap();

        assert_eq!(issued.token.len(), 64);
        assert!(issued.expires_at > Utc::now() + Duration::days(6));

        assert_eq!(service.consume(&issued.token).await.unwrap(), "user-1");
        assert!(matches!(
            service.consume(&issued.token).await,
            Err(RefreshTokenError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unknown_token_not_found() {
        let service = service_with(Arc::new(InMemoryRefreshTokenRepository::new()));

        assert!(matches!(
            service.consume("does-not-exist").await,
            Err(RefreshTokenError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_and_deleted() {
        let repo = Arc::new(InMemoryRefreshTokenRepository::new());
        let service = service_with(repo.clone());
        repo.insert(RefreshTokenRecord::new(
            hash_token("stale"),
            "user-1".to_string(),
            from_chrono(Utc::now() - Duration::minutes(1)),
        ))
        .await
        .unwrap();

        assert!(matches!(service.consume("stale").await, Err(RefreshTokenError::Expired)));
        assert_eq!(repo.count(), 0);
        assert!(matches!(service.consume("stale").await, Err(RefreshTokenError::NotFound)));
    }

    #[tokio::test]
    async fn test_concurrent_consume_single_winner() {
        let service = Arc::new(service_with(Arc::new(InMemoryRefreshTokenRepository::new())));
        let issued = service.issue("user-1").await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                let token = issued.token.clone();
                tokio::spawn(async move { service.consume(&token).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(user_id) => {
                    assert_eq!(user_id, "user-1");
                    winners += 1;
                }
                Err(err) => assert!(matches!(err, RefreshTokenError::NotFound)),
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_revoke_all_and_purge() {
        let repo = Arc::new(InMemoryRefreshTokenRepository::new());
        let service = service_with(repo.clone());
        let first = service.issue("user-1").await.unwrap();
        service.issue("user-1").await.unwrap();
        service.issue("user-2").await.unwrap();
        repo.insert(RefreshTokenRecord::new(
            hash_token("stale"),
            "user-3".to_string(),
            from_chrono(Utc::now() - Duration::minutes(1)),
        ))
        .await
        .unwrap();

        assert_eq!(service.revoke_all("user-1").await.unwrap(), 2);
        assert_eq!(service.purge_expired().await.unwrap(), 1);
        assert_eq!(repo.count(), 1);
        assert!(matches!(service.consume(&first.token).await, Err(RefreshTokenError::NotFound)));
    }
}
