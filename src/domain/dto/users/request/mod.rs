pub mod auth_request;
pub mod profile_request;

pub use auth_request::{
    ForgotPasswordRequest, LoginRequest, OAuthCallbackQuery, RegisterRequest, ResetPasswordRequest, VerifyEmailQuery,
};
pub use profile_request::{ChangePasswordRequest, UpdateProfileRequest};
