//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`string_utils`] - 문자열 검증, 정리, 변환
//! - [`crypto_utils`] - 보안 난수 토큰, 토큰 다이제스트, 비밀번호 해싱
//! - [`time_utils`] - BSON/chrono 시간 변환
//! - [`deadline`] - 저장소 호출 시간 제한

pub mod crypto_utils;
pub mod deadline;
pub mod string_utils;
pub mod time_utils;
