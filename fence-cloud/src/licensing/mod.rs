//! License key generation and the domain activation flow

pub mod activation;
pub mod keygen;
