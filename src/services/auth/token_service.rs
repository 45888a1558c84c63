//! JWT 액세스 토큰 코덱
//!
//! HS256 대칭키로 `{sub, role, iat, exp, jti}` 클레임을 서명/검증합니다.
//! 설정과 다른 알고리즘으로 서명된 토큰은 거부하며, 클레임은 타입이 정해진
//! 구조체로 디코딩되므로 필드가 빠지거나 타입이 다르면 `Invalid`가 됩니다.
//! 부수효과 없이 입력과 주입된 비밀키에만 의존합니다.
//!
//! 같은 비밀키로 OAuth `state` 값도 서명합니다. 상태 토큰은 `aud`가
//! `oauth_state`로 고정되고 `sub`/`role`이 없으므로 액세스 토큰으로 통과하지 못합니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::domain::entities::users::Role;
use crate::domain::models::oauth::{OAuthStateClaims, OAUTH_STATE_AUDIENCE};
use crate::domain::models::token::TokenClaims;
use crate::errors::AppError;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    /// 형식 오류, 서명 불일치, 알고리즘 불일치, 클레임 누락
    #[error("invalid token")]
    Invalid,

    /// `now >= exp`
    #[error("token expired")]
    Expired,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => {
                AppError::AuthenticationError("Invalid or expired token".to_string())
            }
            TokenError::Signing(msg) => AppError::InternalError(format!("JWT 토큰 생성 실패: {}", msg)),
        }
    }
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    state_validation: Validation,
    access_ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 만료는 `now >= exp` 규칙으로 직접 판정
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let mut state_validation = Validation::new(Algorithm::HS256);
        state_validation.validate_exp = false;
        state_validation.leeway = 0;
        state_validation.set_audience(&[OAUTH_STATE_AUDIENCE]);
        state_validation.set_required_spec_claims(&["aud", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            state_validation,
            access_ttl: config.access_token_ttl(),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn issue(&self, subject: &str, role: Role, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// 설정된 수명으로 액세스 토큰을 발급합니다.
    pub fn issue_access_token(&self, subject: &str, role: Role) -> Result<String, TokenError> {
        self.issue(subject, role, self.access_ttl)
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let claims = self.decode_claims(token)?;
        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// 서명만 검증하고 만료 시각을 꺼냅니다. 이미 만료된 토큰도 성공합니다.
    pub fn decode_expiry(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        let claims = self.decode_claims(token)?;
        DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Invalid)
    }

    /// OAuth 리다이렉트에 실어 보낼 서명된 `state` 값
    pub fn issue_oauth_state(&self, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = OAuthStateClaims {
            aud: OAUTH_STATE_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify_oauth_state(&self, state: &str) -> Result<OAuthStateClaims, TokenError> {
        let claims = decode::<OAuthStateClaims>(state, &self.decoding_key, &self.state_validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)?;
        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn decode_claims(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

/// `Authorization` 헤더 값에서 `Bearer ` 뒤의 토큰을 꺼냅니다.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&JwtConfig {
            secret: "test-secret".to_string(),
            access_token_hours: 72,
            refresh_token_days: 7,
        })
    }

    #[test]
    fn test_issue_then_verify_returns_subject_and_role() {
        let codec = codec();
        let token = codec
            .issue("64b7f0c2a1b2c3d4e5f60718", Role::SuperAdmin, Duration::minutes(5))
            .unwrap();

        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.sub, "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(claims.role, Role::SuperAdmin);
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_default_access_ttl_is_72_hours() {
        let codec = codec();
        let token = codec.issue_access_token("user-1", Role::User).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 72 * 3600);
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let past = codec.issue("user-1", Role::User, Duration::seconds(-10)).unwrap();
        let now = codec.issue("user-1", Role::User, Duration::zero()).unwrap();

        assert_eq!(codec.verify(&past), Err(TokenError::Expired));
        assert_eq!(codec.verify(&now), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let codec = codec();
        let token = codec.issue("user-1", Role::User, Duration::minutes(5)).unwrap();

        let flip = |token: &str, index: usize| {
            let mut bytes = token.as_bytes().to_vec();
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            String::from_utf8(bytes).unwrap()
        };
        let tampered_payload = flip(&token, token.find('.').unwrap() + 3);
        let signature_tampered = flip(&token, token.rfind('.').unwrap() + 5);

        assert_eq!(codec.verify(&tampered_payload), Err(TokenError::Invalid));
        assert_eq!(codec.verify(&signature_tampered), Err(TokenError::Invalid));
        assert_eq!(codec.verify("not.a.jwt"), Err(TokenError::Invalid));
    }

    #[test]
    fn test_rejects_other_secret_and_algorithm() {
        let codec = codec();
        let other = TokenCodec::new(&JwtConfig {
            secret: "another-secret".to_string(),
            ..JwtConfig::default()
        });
        let foreign = other.issue("user-1", Role::User, Duration::minutes(5)).unwrap();

        let claims = TokenClaims {
            sub: "user-1".to_string(),
            role: Role::User,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            jti: "jti".to_string(),
        };
        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(codec.verify(&foreign), Err(TokenError::Invalid));
        assert_eq!(codec.verify(&hs512), Err(TokenError::Invalid));
    }

    #[test]
    fn test_missing_role_claim_is_invalid() {
        let codec = codec();
        let untyped = serde_json::json!({
            "sub": "user-1",
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::minutes(5)).timestamp(),
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &untyped,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tokens_issued_together_differ() {
        let codec = codec();
        let first = codec.issue_access_token("user-1", Role::User).unwrap();
        let second = codec.issue_access_token("user-1", Role::User).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_decode_expiry_accepts_expired_token() {
        let codec = codec();
        let expired = codec.issue("user-1", Role::User, Duration::seconds(-30)).unwrap();

        let expires_at = codec.decode_expiry(&expired).unwrap();

        assert!(expires_at < Utc::now());
        assert_eq!(codec.decode_expiry("garbage"), Err(TokenError::Invalid));
    }

    #[test]
    fn test_oauth_state_round_trip() {
        let codec = codec();
        let state = codec.issue_oauth_state(Duration::minutes(10)).unwrap();

        let claims = codec.verify_oauth_state(&state).unwrap();

        assert_eq!(claims.aud, OAUTH_STATE_AUDIENCE);
        assert_eq!(claims.exp - claims.iat, 600);
    }

    #[test]
    fn test_oauth_state_and_access_token_are_not_interchangeable() {
        let codec = codec();
        let state = codec.issue_oauth_state(Duration::minutes(10)).unwrap();
        let access = codec.issue_access_token("user-1", Role::User).unwrap();

        assert_eq!(codec.verify(&state).map(|_| ()), Err(TokenError::Invalid));
        assert!(codec.verify_oauth_state(&access).is_err());
    }

    #[test]
    fn test_oauth_state_expiry_and_foreign_secret() {
        let codec = codec();
        let expired = codec.issue_oauth_state(Duration::seconds(-1)).unwrap();
        let foreign = TokenCodec::new(&JwtConfig {
            secret: "another-secret".to_string(),
            ..JwtConfig::default()
        })
        .issue_oauth_state(Duration::minutes(10))
        .unwrap();

        assert!(matches!(codec.verify_oauth_state(&expired), Err(TokenError::Expired)));
        assert!(matches!(codec.verify_oauth_state(&foreign), Err(TokenError::Invalid)));
        assert!(matches!(codec.verify_oauth_state("garbage"), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(extract_bearer_token("abc.def.ghi"), None);
    }
}
