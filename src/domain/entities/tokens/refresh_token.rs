//! 리프레시 토큰 레코드
//!
//! 원문 토큰은 응답으로만 전달되고 저장소에는 SHA-256 다이제스트가 남습니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: DateTime,
    pub created_at: DateTime,
}

impl RefreshTokenRecord {
    pub fn new(token_hash: String, user_id: String, expires_at: DateTime) -> Self {
        Self {
            id: None,
            token_hash,
            user_id,
            expires_at,
            created_at: DateTime::now(),
        }
    }

    /// `now >= expires_at`이면 만료
    pub fn is_expired_at(&self, now: DateTime) -> bool {
        now >= self.expires_at
    }
}
