/// Typed per-board access on top of the key-value store.
pub mod board;
/// Key-value store contract and its backends.
pub mod kv_store;
/// Persisted record shapes.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
