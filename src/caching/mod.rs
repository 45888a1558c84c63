//! 캐싱 계층 모듈
//!
//! Redis 연결을 감싼 [`redis::RedisClient`]를 제공합니다.
//! 다중 인스턴스 배포에서 폐기 토큰 레지스트리를 공유할 때 사용합니다.
//!
//! ```bash
//! REVOCATION_BACKEND=redis
//! REDIS_URL=redis://localhost:6379  # 기본값
//! ```

pub mod redis;
