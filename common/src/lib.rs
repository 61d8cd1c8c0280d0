//! Shared building blocks for the roster services: models, errors,
//! configuration, middleware and response envelopes.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
