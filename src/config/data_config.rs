//! 데이터 및 서버 설정 관리 모듈
//!
//! 실행 환경, 저장소, 서버, 요청 제한 설정을 다룹니다.
//! 모든 값은 기동 시 한 번 읽혀 불변 구조체로 보관됩니다.

use std::env;
use std::time::Duration;

use super::{env_in_range, env_or};

const DEFAULT_SWEEP_SECONDS: u64 = 300;

/// 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// `ENVIRONMENT` 환경 변수에서 현재 환경을 읽습니다 (기본값: development)
    pub fn current() -> Self {
        Self::from_str(&env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()))
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

/// 비밀번호 해싱 설정
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub bcrypt_cost: u32,
}

impl PasswordConfig {
    /// `BCRYPT_COST`가 4..=15 범위면 그 값을, 아니면 환경별 기본값을 사용합니다.
    pub fn from_env(environment: &Environment) -> Self {
        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|cost| cost.parse::<u32>().ok())
            .filter(|cost| (4..=15).contains(cost))
            .unwrap_or_else(|| Self::bcrypt_cost_for_env(environment));

        Self { bcrypt_cost }
    }

    pub fn bcrypt_cost_for_env(env: &Environment) -> u32 {
        match env {
            Environment::Development => 10,
            Environment::Test => 4,
            Environment::Staging => 10,
            Environment::Production => 12,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self { bcrypt_cost: 4 }
    }
}

/// HTTP 서버 바인딩 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_or("SERVER_PORT", 8000),
            workers: env_in_range("SERVER_WORKERS", 4, 1..=256),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 사용자/리프레시 토큰 저장소 종류
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    MongoDb,
    Memory,
}

/// 폐기 토큰 레지스트리 종류
#[derive(Debug, Clone, PartialEq)]
pub enum RevocationBackend {
    Memory,
    Redis,
}

/// 저장소 연결 설정
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub uri: String,
    pub name: String,
    /// 모든 저장소 호출에 적용되는 상한 시간
    pub timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "mongodb".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" | "in-memory" => StorageBackend::Memory,
            _ => StorageBackend::MongoDb,
        };

        Self {
            backend,
            uri: env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            name: env::var("DATABASE_NAME").unwrap_or_else(|_| "session_auth_dev".to_string()),
            timeout: Duration::from_millis(env_in_range("STORAGE_TIMEOUT_MS", 5_000, 50..=60_000)),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            uri: "mongodb://localhost:27017".to_string(),
            name: "session_auth_test".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// 폐기 레지스트리 설정
#[derive(Debug, Clone)]
pub struct RevocationConfig {
    pub backend: RevocationBackend,
    pub redis_url: String,
    /// 메모리 레지스트리의 만료 항목 정리 주기
    pub sweep_interval: Duration,
}

impl RevocationConfig {
    pub fn from_env() -> Self {
        let backend = match env::var("REVOCATION_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "redis" => RevocationBackend::Redis,
            _ => RevocationBackend::Memory,
        };

        Self {
            backend,
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            sweep_interval: Duration::from_secs(env_in_range(
                "REVOCATION_SWEEP_SECONDS",
                DEFAULT_SWEEP_SECONDS,
                1..=86_400,
            )),
        }
    }
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            backend: RevocationBackend::Memory,
            redis_url: "redis://localhost:6379".to_string(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_SECONDS),
        }
    }
}

/// Rate Limiting 설정
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            per_second: env_in_range("RATE_LIMIT_PER_SECOND", 100, 1..=100_000),
            burst_size: env_in_range("RATE_LIMIT_BURST_SIZE", 200, 1..=1_000_000),
        }
    }
}
