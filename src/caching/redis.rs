//! # Redis 클라이언트
//!
//! `ConnectionManager`로 멀티플렉싱된 단일 연결을 공유하고,
//! 끊기면 자동으로 재연결합니다. 값은 JSON으로 직렬화해 저장합니다.

use log::info;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::Serialize;

#[derive(Clone)]
pub struct RedisClient {
    connection: ConnectionManager,
}

impl RedisClient {
    /// 연결 후 PING으로 서버 가용성을 확인합니다.
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = Client::open(redis_url)?;
        let mut connection = client.get_connection_manager().await?;

        redis::cmd("PING").query_async::<()>(&mut connection).await?;
        info!("✅ Redis 연결 성공");

        Ok(Self { connection })
    }

    /// JSON 값을 TTL(초)과 함께 저장합니다 (`SETEX`).
    pub async fn set_with_expiry<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        seconds: u64,
    ) -> Result<(), redis::RedisError> {
        let json = serde_json::to_string(value).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialization failed", e.to_string()))
        })?;
        let mut conn = self.connection.clone();
        conn.set_ex(key, json, seconds).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool, redis::RedisError> {
        let mut conn = self.connection.clone();
        conn.exists(key).await
    }
}
