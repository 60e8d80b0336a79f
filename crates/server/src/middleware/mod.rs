//! Request-level middleware and extractors.

pub mod auth;
