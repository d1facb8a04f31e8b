//! Provider-neutral requests, stream events, errors and the provider trait

pub mod config;
pub mod error;
pub mod provider;
pub mod types;
