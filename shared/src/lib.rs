//! Shared types for the GermanFence licensing cloud
//!
//! Domain model (packages, license status, feature flags, domain
//! normalization) and the unified error system used by the API service.

pub mod domain;
pub mod error;
pub mod license;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
