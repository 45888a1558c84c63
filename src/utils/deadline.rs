//! 저장소 호출 시간 제한
//!
//! 저장소 왕복은 설정된 상한 안에 끝나야 하며, 넘기면 `ServiceUnavailable`(503)로
//! 표면화됩니다. 타임아웃으로 future가 드롭되어도 이미 반영된 저장소 변경은
//! 되돌리지 않습니다.

use std::future::Future;
use std::time::Duration;

use log::error;

use crate::errors::{AppError, AppResult};

pub async fn with_deadline<T, F>(limit: Duration, operation: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            error!("⏱️ {} 작업이 {:?} 안에 끝나지 않았습니다", operation, limit);
            Err(AppError::ServiceUnavailable(format!(
                "{} timed out after {}ms",
                operation,
                limit.as_millis()
            )))
        }
    }
}
