//! # 폐기 토큰 레지스트리
//!
//! 로그아웃으로 명시적으로 무효화된 액세스 토큰을 자연 만료 시각까지
//! 기억합니다. 인증이 필요한 모든 요청에서 멤버십 검사로만 사용됩니다.
//!
//! 만료 시각이 지난 항목은 언제 지워도 정확성에 영향이 없습니다.
//! 어차피 토큰 코덱 검증에서 `Expired`로 거부되기 때문입니다.
//!
//! ## 구현
//!
//! | 구현 | 범위 | 만료 처리 |
//! |------|------|-----------|
//! | [`InMemoryRevocationRegistry`] | 단일 프로세스 | 조회 시 지연 판정 + 주기적 정리 |
//! | [`RedisRevocationRegistry`] | 인스턴스 간 공유 | Redis TTL |
//!
//! 메모리 구현은 인스턴스마다 따로 존재하므로, 여러 인스턴스로 배포하면
//! 다른 인스턴스에서 기록된 로그아웃을 보지 못합니다. 그런 배포에서는
//! `REVOCATION_BACKEND=redis`를 사용해야 합니다.
//!
//! 키는 원문 토큰의 SHA-256 다이제스트입니다.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::caching::redis::RedisClient;
use crate::errors::{AppError, AppResult};
use crate::utils::crypto_utils::hash_token;

const REDIS_KEY_PREFIX: &str = "revoked_token:";

#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    /// `expires_at`까지 폐기로 기록합니다. 같은 토큰을 다시 폐기해도 변화 없음.
    async fn revoke(&self, raw_token: &str, expires_at: DateTime<Utc>) -> AppResult<()>;

    async fn is_revoked(&self, raw_token: &str) -> AppResult<bool>;

    /// 만료된 항목을 제거하고 제거한 개수를 반환합니다.
    async fn purge_expired(&self) -> AppResult<usize>;

    /// 프로세스 종료 시 호출
    fn shutdown(&self) {}
}

/// 프로세스 메모리 폐기 레지스트리
pub struct InMemoryRevocationRegistry {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
    last_sweep: RwLock<Instant>,
    sweep_interval: StdDuration,
}

impl InMemoryRevocationRegistry {
    pub fn new(sweep_interval: StdDuration) -> Self {
        info!("🗂️ 메모리 폐기 토큰 레지스트리 초기화 (정리 주기 {:?})", sweep_interval);
        Self {
            entries: RwLock::new(HashMap::new()),
            last_sweep: RwLock::new(Instant::now()),
            sweep_interval,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);

        if let Ok(mut last_sweep) = self.last_sweep.write() {
            *last_sweep = Instant::now();
        }
        Ok(before - entries.len())
    }

    fn sweep_due(&self) -> bool {
        self.last_sweep
            .read()
            .map(|last_sweep| last_sweep.elapsed() >= self.sweep_interval)
            .unwrap_or(false)
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::InternalError("revocation registry lock poisoned".to_string())
}

#[async_trait]
impl RevocationRegistry for InMemoryRevocationRegistry {
    async fn revoke(&self, raw_token: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        let now = Utc::now();
        if self.sweep_due() {
            let removed = self.purge(now)?;
            debug!("폐기 레지스트리 지연 정리: {}건 제거", removed);
        }
        if expires_at <= now {
            return Ok(());
        }

        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.entry(hash_token(raw_token)).or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, raw_token: &str) -> AppResult<bool> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(&hash_token(raw_token))
            .is_some_and(|expires_at| *expires_at > Utc::now()))
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        self.purge(Utc::now())
    }

    fn shutdown(&self) {
        if let Ok(mut entries) = self.entries.write() {
            info!("🗂️ 폐기 토큰 레지스트리 종료: {}건 폐기", entries.len());
            entries.clear();
        }
    }
}

/// Redis 공유 폐기 레지스트리. 남은 수명을 TTL로 두어 Redis가 만료를 처리합니다.
pub struct RedisRevocationRegistry {
    redis: RedisClient,
}

impl RedisRevocationRegistry {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    fn key(raw_token: &str) -> String {
        format!("{}{}", REDIS_KEY_PREFIX, hash_token(raw_token))
    }
}

#[async_trait]
impl RevocationRegistry for RedisRevocationRegistry {
    async fn revoke(&self, raw_token: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        let remaining = (expires_at - Utc::now()).num_seconds();
        if remaining <= 0 {
            return Ok(());
        }

        self.redis
            .set_with_expiry(&Self::key(raw_token), &expires_at.timestamp(), remaining as u64)
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, raw_token: &str) -> AppResult<bool> {
        Ok(self.redis.exists(&Self::key(raw_token)).await?)
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn registry() -> InMemoryRevocationRegistry {
        InMemoryRevocationRegistry::new(StdDuration::from_secs(300))
    }

    #[tokio::test]
    async fn test_revoke_then_is_revoked() {
        let registry = registry();
        let expires_at = Utc::now() + Duration::hours(1);

        registry.revoke("token-a", expires_at).await.unwrap();

        assert!(registry.is_revoked("token-a").await.unwrap());
        assert!(!registry.is_revoked("token-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let registry = registry();
        let expires_at = Utc::now() + Duration::hours(1);

        registry.revoke("token-a", expires_at).await.unwrap();
        registry.revoke("token-a", expires_at).await.unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.is_revoked("token-a").await.unwrap());
    }

    #[tokio::test]
    async fn test_already_expired_token_is_not_stored() {
        let registry = registry();

        registry
            .revoke("token-a", Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired_entries() {
        let registry = registry();
        registry
            .revoke("live", Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        registry
            .revoke("short", Utc::now() + Duration::milliseconds(20))
            .await
            .unwrap();

        tokio::time::sleep(StdDuration::from_millis(40)).await;

        assert!(!registry.is_revoked("short").await.unwrap());
        assert_eq!(registry.purge_expired().await.unwrap(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_lazy_sweep_on_revoke() {
        let registry = InMemoryRevocationRegistry::new(StdDuration::ZERO);
        registry
            .revoke("short", Utc::now() + Duration::milliseconds(20))
            .await
            .unwrap();
        tokio::time::sleep(StdDuration::from_millis(40)).await;

        registry
            .revoke("next", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_clears_entries() {
        let registry = registry();
        registry
            .revoke("token-a", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        registry.shutdown();

        assert!(registry.is_empty());
    }
}
