//! Library crate for theatre-bingo-back, exposing modules for binaries and integration tests.

/// Board roster configuration.
pub mod config;
/// Storage layer.
pub mod dao;
/// HTTP payloads.
pub mod dto;
/// Service and HTTP errors.
pub mod error;
/// HTTP routers.
pub mod routes;
/// Operations behind the routes.
pub mod services;
/// Domain types and shared state.
pub mod state;
