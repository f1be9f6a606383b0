//! Key-value storage adapters.
//!
//! Two implementations of the [`KeyValueStore`] port: an in-memory map
//! for ephemeral sessions and tests, and a JSON file for sessions that
//! survive restarts.
//!
//! [`KeyValueStore`]: aegis_application::ports::KeyValueStore

mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
