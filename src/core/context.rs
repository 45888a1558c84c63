//! # Application Context - 명시적 의존성 조립
//!
//! 기동 시 한 번 모든 컴포넌트를 생성하고 서로 연결하는 합성 지점입니다.
//! 전역 컨테이너 없이 생성자 주입으로 의존성이 흐르며, 핸들러는
//! `web::Data`로 공유된 서비스만 사용합니다.
//!
//! ```text
//! AppConfig ─┬─▶ TokenCodec ─────────────┐
//!            ├─▶ UserRepository ─────────┼─▶ SessionManager
//!            ├─▶ RefreshTokenService ────┤
//!            ├─▶ RevocationRegistry ─────┘
//!            ├─▶ UserService (UserRepository + RefreshTokenService)
//!            └─▶ OAuthProvider (Google)
//! ```
//!
//! | Spring 개념 | 이 모듈 |
//! |-------------|---------|
//! | `ApplicationContext` | [`AppContext`] |
//! | `@Configuration` + `@Bean` | [`AppContext::assemble`] |
//! | `@Profile` | `STORAGE_BACKEND` / `REVOCATION_BACKEND` |
//! | `@PreDestroy` | [`AppContext::shutdown`] |

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::task::JoinHandle;

use crate::caching::redis::RedisClient;
use crate::config::{AppConfig, RevocationBackend, StorageBackend};
use crate::db::Database;
use crate::errors::AppResult;
use crate::repositories::tokens::{
    InMemoryRefreshTokenRepository, MongoRefreshTokenRepository, RefreshTokenRepository,
};
use crate::repositories::users::{InMemoryUserRepository, MongoUserRepository, UserRepository};
use crate::services::auth::{
    GoogleOAuthProvider, InMemoryRevocationRegistry, OAuthProvider, RedisRevocationRegistry,
    RefreshTokenService, RevocationRegistry, SessionManager, TokenCodec,
};
use crate::services::users::UserService;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub sessions: Arc<SessionManager>,
    pub users: Arc<UserService>,
    pub refresh_tokens: Arc<RefreshTokenService>,
    pub revocations: Arc<dyn RevocationRegistry>,
    pub oauth: Arc<dyn OAuthProvider>,
}

impl AppContext {
    /// 주어진 저장소 구현으로 서비스 그래프를 조립합니다.
    pub fn assemble(
        config: AppConfig,
        user_repository: Arc<dyn UserRepository>,
        refresh_repository: Arc<dyn RefreshTokenRepository>,
        revocations: Arc<dyn RevocationRegistry>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(&config.jwt));
        let refresh_tokens = Arc::new(RefreshTokenService::new(
            refresh_repository,
            config.jwt.refresh_token_ttl(),
            config.database.timeout,
        ));

        let sessions = Arc::new(SessionManager::new(
            &config,
            user_repository.clone(),
            codec,
            refresh_tokens.clone(),
            revocations.clone(),
        ));
        let users = Arc::new(UserService::new(&config, user_repository, refresh_tokens.clone()));
        let oauth = Arc::new(GoogleOAuthProvider::new(&config.google));

        Self {
            config,
            sessions,
            users,
            refresh_tokens,
            revocations,
            oauth,
        }
    }

    /// 외부 공급자 구현을 교체합니다.
    pub fn with_oauth_provider(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.oauth = provider;
        self
    }

    /// 모든 저장소를 프로세스 메모리로 구성합니다.
    pub fn in_memory(config: AppConfig) -> Self {
        let revocations = Arc::new(InMemoryRevocationRegistry::new(config.revocation.sweep_interval));
        Self::assemble(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryRefreshTokenRepository::new()),
            revocations,
        )
    }

    /// 설정된 백엔드에 연결하고 인덱스를 준비한 뒤 조립합니다.
    pub async fn connect(config: AppConfig) -> AppResult<Self> {
        let (user_repository, refresh_repository): (Arc<dyn UserRepository>, Arc<dyn RefreshTokenRepository>) =
            match config.database.backend {
                StorageBackend::MongoDb => {
                    info!("📡 데이터베이스 연결 중...");
                    let database = Database::connect(&config.database).await?;

                    let users = MongoUserRepository::new(&database);
                    users.create_indexes().await?;
                    let refresh_tokens = MongoRefreshTokenRepository::new(&database);
                    refresh_tokens.create_indexes().await?;

                    (Arc::new(users), Arc::new(refresh_tokens))
                }
                StorageBackend::Memory => {
                    info!("🧪 메모리 저장소 사용 (재시작 시 데이터 소실)");
                    (
                        Arc::new(InMemoryUserRepository::new()),
                        Arc::new(InMemoryRefreshTokenRepository::new()),
                    )
                }
            };

        let revocations: Arc<dyn RevocationRegistry> = match config.revocation.backend {
            RevocationBackend::Redis => {
                let redis = RedisClient::connect(&config.revocation.redis_url).await?;
                Arc::new(RedisRevocationRegistry::new(redis))
            }
            RevocationBackend::Memory => {
                Arc::new(InMemoryRevocationRegistry::new(config.revocation.sweep_interval))
            }
        };

        Ok(Self::assemble(config, user_repository, refresh_repository, revocations))
    }

    /// 만료된 폐기 항목과 리프레시 토큰을 주기적으로 정리하는 백그라운드 작업
    pub fn spawn_maintenance(&self) -> JoinHandle<()> {
        let revocations = self.revocations.clone();
        let refresh_tokens = self.refresh_tokens.clone();
        // interval()은 0 주기에서 패닉
        let period = self.config.revocation.sweep_interval.max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // 첫 tick은 즉시 완료
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match revocations.purge_expired().await {
                    Ok(removed) => debug!("폐기 레지스트리 정리: {}건", removed),
                    Err(e) => error!("❌ 폐기 레지스트리 정리 실패: {}", e),
                }
                match refresh_tokens.purge_expired().await {
                    Ok(removed) => debug!("만료 리프레시 토큰 정리: {}건", removed),
                    Err(e) => error!("❌ 리프레시 토큰 정리 실패: {}", e),
                }
            }
        })
    }

    pub fn shutdown(&self) {
        self.revocations.shutdown();
        info!("👋 애플리케이션 컨텍스트 종료");
    }
}
