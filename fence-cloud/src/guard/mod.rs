//! Server side of the form guard
//!
//! The plugin injects a honeypot field, a timestamp field and a signed token
//! into every protected form. This module issues/verifies those tokens and
//! screens the heuristic signals the plugin reports on submission.

pub mod heuristics;
pub mod token;
