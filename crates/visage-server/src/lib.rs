#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for authentication events.
pub const TRACING_TARGET_AUTHENTICATION: &str = "visage_server::authentication";

/// Tracing target for service state and configuration.
pub const TRACING_TARGET_SERVICE: &str = "visage_server::service";

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;
