//! # 문자열 유틸리티
//!
//! 요청 값 정리와 검증에 쓰는 공통 함수들입니다.

use serde::Deserialize;

use crate::errors::AppError;

/// 필수 문자열 필드 검증 및 정리
///
/// 공백뿐이면 `ValidationError`, 아니면 앞뒤 공백을 제거한 값을 돌려줍니다.
///
/// ```rust,ignore
/// assert_eq!(validate_required_string("  Alice  ", "name").unwrap(), "Alice");
/// assert!(validate_required_string("   ", "name").is_err());
/// ```
pub fn validate_required_string(value: &str, field_name: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!(
            "{}은(는) 필수입니다",
            field_name
        )));
    }
    Ok(trimmed.to_string())
}

/// 선택적 문자열 필드 정리. 빈 문자열/공백은 `None`.
pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// 이메일 비교/저장용 정규화 (공백 제거 + 소문자)
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// serde `deserialize_with`용: 공백뿐인 문자열을 `None`으로 읽습니다.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(clean_optional_string(opt))
}
