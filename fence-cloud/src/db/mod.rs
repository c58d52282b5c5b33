//! Database access layer

pub mod domains;
pub mod invoices;
pub mod licenses;
pub mod password_tokens;
pub mod telemetry;
pub mod users;
