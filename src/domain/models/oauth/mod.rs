pub mod oauth_user;

pub use oauth_user::{OAuthStateClaims, OAuthUserInfo, OAUTH_STATE_AUDIENCE};
