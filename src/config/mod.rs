//! # Configuration Module
//!
//! 환경 변수 기반 설정을 기동 시 한 번 읽어 [`AppConfig`] 불변 값으로 모읍니다.
//! 각 컴포넌트는 생성자에서 필요한 설정 조각을 주입받으며,
//! 요청 처리 중에는 환경 변수를 읽지 않습니다.
//!
//! - [`data_config`] - 실행 환경, 저장소, 서버, 요청 제한
//! - [`auth_config`] - JWT, 계정 흐름, Google OAuth
//!
//! ```rust,ignore
//! let config = AppConfig::from_env();
//! let codec = TokenCodec::new(&config.jwt);
//! ```

pub mod auth_config;
pub mod data_config;

use std::env;
use std::ops::RangeInclusive;
use std::str::FromStr;

use log::{error, warn};

pub use auth_config::{AccountConfig, GoogleOAuthConfig, JwtConfig};
pub use data_config::{
    DatabaseConfig, Environment, PasswordConfig, RateLimitConfig, RevocationBackend,
    RevocationConfig, ServerConfig, StorageBackend,
};

/// 애플리케이션 전체 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub revocation: RevocationConfig,
    pub rate_limit: RateLimitConfig,
    pub jwt: JwtConfig,
    pub account: AccountConfig,
    pub password: PasswordConfig,
    pub google: GoogleOAuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = Environment::current();
        let jwt = JwtConfig::from_env();
        if environment.is_production() && jwt.uses_default_secret() {
            error!("❌ 운영 환경에서 기본 JWT_SECRET을 사용하고 있습니다");
        }

        Self {
            password: PasswordConfig::from_env(&environment),
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            revocation: RevocationConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            account: AccountConfig::from_env(),
            google: GoogleOAuthConfig::from_env(),
            jwt,
            environment,
        }
    }
}

impl Default for AppConfig {
    /// 메모리 저장소와 최소 bcrypt 비용을 쓰는 테스트용 설정
    fn default() -> Self {
        Self {
            environment: Environment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                workers: 1,
            },
            database: DatabaseConfig::default(),
            revocation: RevocationConfig::default(),
            rate_limit: RateLimitConfig {
                per_second: 100,
                burst_size: 200,
            },
            jwt: JwtConfig::default(),
            account: AccountConfig::default(),
            password: PasswordConfig::default(),
            google: GoogleOAuthConfig::default(),
        }
    }
}

/// 환경 변수를 읽어 파싱하고, 없거나 잘못된 값이면 기본값을 사용합니다.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|e| {
            error!("{} 파싱 실패: {}. 기본값 {} 사용", key, e, default);
            default
        }),
        Err(_) => default,
    }
}

/// [`env_or`]로 읽은 값이 `range`를 벗어나면 기본값을 사용합니다.
pub(crate) fn env_in_range<T>(key: &str, default: T, range: RangeInclusive<T>) -> T
where
    T: FromStr + std::fmt::Display + PartialOrd + Copy,
    T::Err: std::fmt::Display,
{
    within_range(key, env_or(key, default), default, range)
}

fn within_range<T>(key: &str, value: T, default: T, range: RangeInclusive<T>) -> T
where
    T: std::fmt::Display + PartialOrd + Copy,
{
    if range.contains(&value) {
        return value;
    }
    warn!(
        "⚠️ {}={} 값이 허용 범위({}..={})를 벗어나 기본값 {} 사용",
        key,
        value,
        range.start(),
        range.end(),
        default
    );
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_values_fall_back_to_default() {
        assert_eq!(within_range("JWT_EXPIRATION", 24i64, 72, 1..=8760), 24);
        assert_eq!(within_range("JWT_EXPIRATION", -5i64, 72, 1..=8760), 72);
        assert_eq!(within_range("JWT_EXPIRATION", i64::MAX / 10, 72, 1..=8760), 72);
        assert_eq!(within_range("REVOCATION_SWEEP_SECONDS", 0u64, 300, 1..=86_400), 300);
        assert_eq!(within_range("REVOCATION_SWEEP_SECONDS", 1u64, 300, 1..=86_400), 1);
    }

    #[test]
    fn test_env_or_falls_back_for_missing_key() {
        assert_eq!(env_or("SESSION_AUTH_SURELY_UNSET_KEY", 42u64), 42);
    }

    #[test]
    fn test_default_config_is_in_memory() {
        let config = AppConfig::default();

        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.revocation.backend, RevocationBackend::Memory);
        assert_eq!(config.password.bcrypt_cost, 4);
    }
}
