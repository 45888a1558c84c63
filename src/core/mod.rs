//! 애플리케이션 핵심 인프라
//!
//! - [`context`] - 설정으로부터 서비스 그래프를 조립하는 합성 지점

pub mod context;

pub use context::AppContext;
