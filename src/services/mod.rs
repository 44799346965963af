/// Roster, sessions and global reset.
pub mod admin_service;
/// Card state, comments and line confirmation.
pub mod board_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check and storage probe.
pub mod health_service;
/// Ranking of boards.
pub mod leaderboard_service;
/// Advisory edit locks.
pub mod lock_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
