//! Persistent key/value storage collaborator.
//!
//! The core only requires string-keyed get/set/remove with JSON-serializable
//! values; the actual persistence format is an external concern. Two
//! implementations ship with the crate: an in-memory store (tests, ephemeral
//! sessions) and an atomic-write JSON file store.

pub mod file;
pub mod kv;

pub use file::JsonFileStore;
pub use kv::{KvStore, MemoryStore};
