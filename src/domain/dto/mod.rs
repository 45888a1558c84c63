//! # Data Transfer Objects
//!
//! HTTP 경계에서 주고받는 요청/응답 구조체입니다.
//! 요청 DTO는 `validator`로 검증되고, 실패는 400 `ValidationError`로 변환됩니다.

pub mod tokens;
pub mod users;

pub use tokens::*;
pub use users::*;
