pub mod refresh_token;

pub use refresh_token::RefreshTokenRecord;
