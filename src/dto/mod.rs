//! Request and response payloads of the REST API.

/// Roster, session and reset payloads.
pub mod admin;
/// Card and line payloads.
pub mod board;
/// Health payloads.
pub mod health;
/// Leaderboard payloads.
pub mod leaderboard;
/// Edit lock payloads.
pub mod lock;
/// Custom field validators.
pub mod validation;
