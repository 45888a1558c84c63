//! 보안 토큰/비밀번호 유틸리티
//!
//! 모든 일회성 토큰(리프레시, 재설정, 이메일 인증)은 OS 난수원에서 뽑은
//! 32바이트(256비트)를 hex로 인코딩해 사용합니다.
//! bcrypt 해싱은 CPU를 오래 점유하므로 블로킹 스레드풀에서 실행합니다.

use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

use crate::errors::{AppResult, ErrorContext};

/// 토큰 엔트로피 (바이트)
pub const TOKEN_BYTES: usize = 32;

/// 암호학적으로 안전한 난수 토큰 (hex, `bytes * 2` 글자)
pub fn generate_secure_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// 저장/조회 키로 쓰는 토큰 다이제스트 (SHA-256, hex)
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// 이름에서 사용자명을 만듭니다: 영숫자 소문자 + 4자리 난수 접미사
///
/// `"John Doe"` → `"johndoe4821"`
pub fn generate_username(name: &str) -> String {
    let mut base: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .take(20)
        .collect();
    if base.len() < 3 {
        base = format!("user{}", base);
    }

    let suffix: u16 = rand::thread_rng().gen_range(1000..10000);
    format!("{}{}", base, suffix)
}

pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("비밀번호 해싱 작업 실패")?
        .context("비밀번호 해싱 실패")
}

/// bcrypt 검증. 해시 형식이 깨졌으면 불일치로 취급합니다.
pub async fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &password_hash).unwrap_or(false)
    })
    .await
    .context("비밀번호 검증 작업 실패")
}
