//! Aegis Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer: the HTTP auth backend, the request transport,
//! key-value storage, and the system clock.

pub mod adapters;
pub mod api;
pub mod storage;

pub use adapters::SystemClock;
pub use api::{HttpAuthApi, ReqwestTransport};
pub use storage::{FileKeyValueStore, MemoryKeyValueStore};
