//! Unified error system for the GermanFence cloud
//!
//! - [`ErrorCode`]: numeric error codes with HTTP mapping and German default
//!   messages (the portal and the WordPress plugin surface German text; the
//!   numeric code is the machine-readable part)
//! - [`AppError`]: rich error type with code, message and structured details
//! - [`ApiResponse`]: unified API response envelope
//!
//! # Error Code Ranges
//!
//! - 0xxx: general errors
//! - 1xxx: authentication errors
//! - 3xxx: license errors
//! - 4xxx: domain activation errors
//! - 5xxx: billing errors
//! - 6xxx: form-guard errors
//! - 9xxx: system errors

mod codes;
mod types;

pub use codes::{ErrorCategory, ErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
