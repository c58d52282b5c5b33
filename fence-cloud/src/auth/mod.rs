pub mod portal_auth;
pub mod rate_limit;
