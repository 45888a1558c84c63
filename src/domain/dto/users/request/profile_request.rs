//! 프로필 수정 / 비밀번호 변경 요청 DTO

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::utils::string_utils::deserialize_optional_string;

/// 프로필 수정 요청. 빈 값은 "변경 없음"으로 취급합니다.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 100, message = "이름은 100자 이하여야 합니다"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 3, max = 30, message = "사용자명은 3-30자 사이여야 합니다"))]
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "현재 비밀번호를 입력해주세요"))]
    pub current_password: String,

    #[validate(length(min = 1, max = 72, message = "비밀번호는 1-72자 사이여야 합니다"))]
    pub new_password: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    // 알파벳, 숫자, 언더스코어만 허용
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::new("invalid_username")
            .with_message("사용자명은 알파벳, 숫자, 언더스코어만 사용 가능합니다".into()));
    }
    Ok(())
}
