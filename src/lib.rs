//! Library crate for strategy-coordinator, exposing modules for the binary and integration tests.

/// Configuration file and environment loading.
pub mod config;
/// Outbound access to external services.
pub mod dao;
/// Wire-facing data types.
pub mod dto;
/// Error types for the coordinator and the HTTP surface.
pub mod error;
/// HTTP routers.
pub mod routes;
/// Coordinator, executor, classifier and background drivers.
pub mod services;
/// Shared application state.
pub mod state;
