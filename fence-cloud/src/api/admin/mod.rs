//! Admin API endpoints (behind the admin gate)

mod licenses;
mod telemetry;

pub use licenses::{create_license, delete_license, list_licenses, set_license_status};
pub use telemetry::telemetry_overview;
