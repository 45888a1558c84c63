pub mod request;
pub mod response;

pub use request::RefreshTokenRequest;
pub use response::{MessageResponse, TokenRefreshResponse};
