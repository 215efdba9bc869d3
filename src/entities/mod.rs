pub mod billing;
pub mod user_auth;
